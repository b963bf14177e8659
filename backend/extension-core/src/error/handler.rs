//! Failures reported by versioned handlers.
//!
//! The processor never inspects the message text of these errors. It asks
//! for the status, the error code, and the detail, and builds the envelope
//! from those three.

use crate::catalog::ErrorCode;

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum HandlerError {
    /// Malformed request detected by the handler (missing or null field).
    #[error("Validation Error: {message} {location}")]
    Validation {
        error_code: ErrorCode,
        message: String,
        location: ErrorLocation,
    },

    /// The platform could not be reached at all.
    #[error("Transport Error: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },

    /// The platform answered with a failure status.
    #[error("Platform Error: HTTP {status_code} - {message} {location}")]
    Platform {
        status_code: HttpStatusCode,
        message: String,
        location: ErrorLocation,
    },

    /// Handler-chosen status and code.
    #[error("Rejected Error: HTTP {status_code} - {message} {location}")]
    Rejected {
        status_code: HttpStatusCode,
        error_code: Option<ErrorCode>,
        message: String,
        location: ErrorLocation,
    },

    /// Anything unanticipated. The message is logged, never returned.
    #[error("Internal Error: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl HandlerError {
    #[track_caller]
    pub fn validation(error_code: ErrorCode, message: impl Into<String>) -> Self {
        HandlerError::Validation {
            error_code,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        HandlerError::Transport {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn platform(status_code: u16, message: impl Into<String>) -> Self {
        HandlerError::Platform {
            status_code: HttpStatusCode(status_code),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn rejected(
        status_code: HttpStatusCode,
        error_code: Option<ErrorCode>,
        message: impl Into<String>,
    ) -> Self {
        HandlerError::Rejected {
            status_code,
            error_code,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        HandlerError::Internal {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn status_code(&self) -> HttpStatusCode {
        match self {
            HandlerError::Validation { .. } => HttpStatusCode::BAD_REQUEST,
            HandlerError::Transport { .. } => HttpStatusCode::INTERNAL_SERVER_ERROR,
            HandlerError::Platform { status_code, .. } => *status_code,
            HandlerError::Rejected { status_code, .. } => *status_code,
            HandlerError::Internal { .. } => HttpStatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            HandlerError::Validation { error_code, .. } => *error_code,
            HandlerError::Platform { .. } => ErrorCode::PLATFORM_REQUEST_FAILED,
            HandlerError::Rejected { error_code, .. } => error_code.unwrap_or(ErrorCode::DEFAULT),
            HandlerError::Transport { .. } | HandlerError::Internal { .. } => ErrorCode::DEFAULT,
        }
    }

    /// Text safe to put in a response. Internal errors expose nothing.
    pub fn detail(&self) -> &str {
        match self {
            HandlerError::Validation { message, .. }
            | HandlerError::Transport { message, .. }
            | HandlerError::Platform { message, .. }
            | HandlerError::Rejected { message, .. } => message,
            HandlerError::Internal { .. } => "",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, HandlerError::Internal { .. })
    }

    /// The platform refused the bearer token we attached.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            HandlerError::Platform { status_code, .. } if status_code.is_auth_rejection()
        )
    }
}

impl From<serde_json::Error> for HandlerError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        HandlerError::Internal {
            message: format!("JSON error: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<url::ParseError> for HandlerError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        HandlerError::Internal {
            message: format!("URL parse error: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
