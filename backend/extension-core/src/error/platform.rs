use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures while building a platform client. Per-request platform failures
/// are [`HandlerError`](super::HandlerError)s instead.
#[derive(Debug, ThisError)]
pub enum PlatformError {
    #[error("HTTP Client Error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
    },

    #[error("URL Parse Error: {message} {location}")]
    UrlParse {
        message: String,
        location: ErrorLocation,
    },
}

impl From<url::ParseError> for PlatformError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        PlatformError::UrlParse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for PlatformError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        PlatformError::Http {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
