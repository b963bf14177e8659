use crate::OAUTH_TOKEN_PATH;

use common::RedactedSecret;

use std::fmt;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Client credentials for one identity provider.
///
/// Immutable once built. The Basic header is derived a single time here, so
/// the raw `id:secret` pair never exists past construction.
#[derive(Clone)]
pub struct Credential {
    base_url: String,
    client_id: String,
    client_secret: RedactedSecret,
    auth_header: RedactedSecret,
}

impl Credential {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: RedactedSecret,
    ) -> Self {
        let client_id = client_id.into();
        let pair = RedactedSecret::new(format!("{client_id}:{}", client_secret.expose()));
        let auth_header =
            RedactedSecret::new(format!("Basic {}", STANDARD.encode(pair.expose().as_bytes())));

        Self {
            base_url: base_url.into(),
            client_id,
            client_secret,
            auth_header,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &RedactedSecret {
        &self.client_secret
    }

    /// `"Basic " + base64(client_id ":" client_secret)`.
    pub fn auth_header(&self) -> &str {
        self.auth_header.expose()
    }

    /// `{base_url}/oauth/token`.
    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), OAUTH_TOKEN_PATH)
    }

    /// Cache key: which provider, which client. The secret is not part of it.
    pub fn identity(&self) -> CredentialIdentity {
        CredentialIdentity(format!(
            "{}#{}",
            self.base_url.trim_end_matches('/'),
            self.client_id
        ))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialIdentity(String);

impl fmt::Display for CredentialIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bearer token handed out by the identity provider.
#[derive(Debug, Clone)]
pub struct Token {
    access_token: RedactedSecret,
    expires_in: Option<Duration>,
    acquired_at: Instant,
}

impl Token {
    pub fn new(access_token: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            access_token: RedactedSecret::new(access_token),
            expires_in,
            acquired_at: Instant::now(),
        }
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose()
    }

    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }

    /// `"Bearer {token}"`.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.access_token.expose())
    }

    /// Still usable for at least `refresh_skew`. Tokens without an expiry are
    /// assumed to live for `default_ttl`.
    pub fn is_fresh(&self, default_ttl: Duration, refresh_skew: Duration) -> bool {
        let lifetime = self.expires_in.unwrap_or(default_ttl);
        self.acquired_at.elapsed() + refresh_skew < lifetime
    }
}
