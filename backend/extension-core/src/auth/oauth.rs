//! OAuth client-credentials exchange.
//!
//! Stateless per call: no caching, no retries. Callers that want either wrap
//! this in [`TokenCache`](super::TokenCache) or retry at the processor level.

use super::{Credential, Token, TokenProvider};
use crate::CLIENT_CREDENTIALS_GRANT;
use crate::error::AuthError;

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use serde_json::Value;

pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(10);
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const NO_CACHE: &str = "no-cache";
const ACCESS_TOKEN_FIELD: &str = "access_token";
const EXPIRES_IN_FIELD: &str = "expires_in";

#[derive(Debug, Clone)]
pub struct OAuthTokenProvider {
    client: Client,
    timeout: Duration,
}

impl OAuthTokenProvider {
    /// Build a provider with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Transport`] if the proxy URL is invalid or the
    /// client cannot be built.
    pub fn new(timeout: Duration, proxy_url: Option<&str>) -> Result<Self, AuthError> {
        let mut builder = Client::builder().timeout(timeout);

        if let Some(proxy_url) = proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| AuthError::from_reqwest(&e, timeout.as_secs()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| AuthError::from_reqwest(&e, timeout.as_secs()))?;

        Ok(Self { client, timeout })
    }

    /// Reuse an existing client. The outer timeout still applies.
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn exchange(&self, credential: &Credential) -> Result<Token, AuthError> {
        let url = credential.token_url();
        let timeout_secs = self.timeout.as_secs();

        debug!(
            "Requesting client-credentials token from {url} for client '{}'",
            credential.client_id()
        );

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(AUTHORIZATION, credential.auth_header())
            .header(CACHE_CONTROL, NO_CACHE)
            .body(CLIENT_CREDENTIALS_GRANT)
            .send()
            .await
            .map_err(|e| AuthError::from_reqwest(&e, timeout_secs))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::from_reqwest(&e, timeout_secs))?;

        if !status.is_success() {
            warn!("Identity provider at {url} answered HTTP {}", status.as_u16());
            return Err(AuthError::from_http_response(status.as_u16(), body));
        }

        parse_token_response(&body)
    }
}

#[async_trait]
impl TokenProvider for OAuthTokenProvider {
    async fn acquire_token(&self, credential: &Credential) -> Result<Token, AuthError> {
        match tokio::time::timeout(self.timeout, self.exchange(credential)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Token exchange for client '{}' exceeded {:?}",
                    credential.client_id(),
                    self.timeout
                );
                Err(AuthError::timeout(self.timeout.as_secs()))
            }
        }
    }
}

/// Pull `access_token` (and `expires_in` when present) out of a token
/// response body. An absent, non-string or empty token is malformed.
pub fn parse_token_response(body: &str) -> Result<Token, AuthError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| AuthError::malformed(format!("token response is not JSON: {e}")))?;

    let access_token = match json.get(ACCESS_TOKEN_FIELD).and_then(Value::as_str) {
        Some(token) if !token.is_empty() => token,
        Some(_) => return Err(AuthError::malformed("access_token is empty")),
        None => return Err(AuthError::malformed("access_token field is missing")),
    };

    let expires_in = json
        .get(EXPIRES_IN_FIELD)
        .and_then(Value::as_u64)
        .map(Duration::from_secs);

    Ok(Token::new(access_token, expires_in))
}
