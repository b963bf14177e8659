//! Bearer-token acquisition for outbound platform calls.
//!
//! # Pieces
//! - [`Credential`]: client id/secret plus the derived Basic header
//! - [`Token`]: the bearer token and its optional lifetime
//! - [`TokenProvider`]: the seam the processor depends on
//! - [`OAuthTokenProvider`]: client-credentials exchange over HTTP
//! - [`TokenCache`]: expiry-aware, single-flight wrapper around any provider
//!
//! # Security
//! - Secrets and tokens live in `RedactedSecret` (redacted Debug, zeroized)
//! - Neither is ever logged

pub mod cache;
pub mod credential;
pub mod oauth;

pub use cache::TokenCache;
pub use credential::{Credential, CredentialIdentity, Token};
pub use oauth::{DEFAULT_TOKEN_TIMEOUT, OAuthTokenProvider};

use crate::error::AuthError;

use async_trait::async_trait;

/// Exchanges a credential for a bearer token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire_token(&self, credential: &Credential) -> Result<Token, AuthError>;

    /// Forget any token held for `credential`. Stateless providers ignore it.
    async fn invalidate(&self, _credential: &Credential) {}
}
