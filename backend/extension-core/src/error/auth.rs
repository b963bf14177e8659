//! Error types for the client-credentials token exchange.
//!
//! Key design decisions:
//! - HTTP status codes stored directly (not parsed from strings)
//! - `is_retryable()` uses error category, not message content
//! - `reason()` gives the stable short reason carried into logs
//! - `#[track_caller]` for automatic location capture

use common::{ErrorLocation, HttpStatusCode};
use std::panic::Location;
use thiserror::Error as ThisError;

pub const REASON_TRANSPORT: &str = "transport failure";
pub const REASON_TIMEOUT: &str = "timeout";
pub const REASON_INVALID_CREDENTIALS: &str = "invalid credentials";
pub const REASON_MALFORMED_RESPONSE: &str = "malformed response";

#[derive(Debug, ThisError)]
pub enum AuthError {
    #[error("Auth Transport Error: {message} {location}")]
    Transport {
        message: String,
        status_code: Option<HttpStatusCode>,
        is_connection: bool,
        location: ErrorLocation,
    },

    #[error("Auth Timeout Error: token exchange exceeded {timeout_secs}s {location}")]
    Timeout {
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("Auth Rejected Error: HTTP {status_code} - {message} {location}")]
    InvalidCredentials {
        status_code: HttpStatusCode,
        message: String,
        location: ErrorLocation,
    },

    #[error("Auth Malformed Response Error: {message} {location}")]
    MalformedResponse {
        message: String,
        location: ErrorLocation,
    },
}

impl AuthError {
    #[track_caller]
    pub fn timeout(timeout_secs: u64) -> Self {
        AuthError::Timeout {
            timeout_secs,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        AuthError::MalformedResponse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        AuthError::Transport {
            message: message.into(),
            status_code: None,
            is_connection: false,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create from an identity-provider response that was not 2xx.
    ///
    /// 401/403 mean the credential itself was refused; every other status is a
    /// transport-level failure from the core's point of view.
    #[track_caller]
    pub fn from_http_response(status_code: u16, body: impl Into<String>) -> Self {
        let status_code = HttpStatusCode(status_code);
        let location = ErrorLocation::from(Location::caller());

        if status_code.is_auth_rejection() {
            return AuthError::InvalidCredentials {
                status_code,
                message: body.into(),
                location,
            };
        }

        AuthError::Transport {
            message: format!("identity provider returned HTTP {status_code}: {}", body.into()),
            status_code: Some(status_code),
            is_connection: false,
            location,
        }
    }

    /// Create from reqwest error with proper categorization.
    #[track_caller]
    pub fn from_reqwest(error: &reqwest::Error, timeout_secs: u64) -> Self {
        // Check for specific error types BEFORE converting to string
        if error.is_timeout() {
            return AuthError::Timeout {
                timeout_secs,
                location: ErrorLocation::from(Location::caller()),
            };
        }

        if error.is_decode() {
            return AuthError::MalformedResponse {
                message: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        AuthError::Transport {
            message: error.to_string(),
            status_code: error.status().map(|s| HttpStatusCode(s.as_u16())),
            is_connection: error.is_connect(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Stable short reason.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Transport { .. } => REASON_TRANSPORT,
            AuthError::Timeout { .. } => REASON_TIMEOUT,
            AuthError::InvalidCredentials { .. } => REASON_INVALID_CREDENTIALS,
            AuthError::MalformedResponse { .. } => REASON_MALFORMED_RESPONSE,
        }
    }

    /// Transport failures and timeouts may succeed on a later attempt; a
    /// rejected credential or a garbled token response will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            AuthError::Transport { status_code, .. } => match status_code {
                None => true,
                Some(status) => status.is_retryable() || status.is_server_error(),
            },
            AuthError::Timeout { .. } => true,
            AuthError::InvalidCredentials { .. } => false,
            AuthError::MalformedResponse { .. } => false,
        }
    }

    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials { .. })
    }

    /// Get HTTP status code if the identity provider answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AuthError::Transport { status_code, .. } => status_code.map(|s| s.0),
            AuthError::InvalidCredentials { status_code, .. } => Some(status_code.0),
            _ => None,
        }
    }
}
