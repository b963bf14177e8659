use extension_core::error::{ConfigError, CoreError};

use common::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Startup failures of the extension server.
///
/// Anything that goes wrong while processing a request is reported in the
/// response envelope instead; these are the cases where no envelope can be
/// produced at all.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerError {
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    #[error("Startup Error: {message} {location}")]
    Startup {
        message: String,
        location: ErrorLocation,
    },

    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    #[error("Request Input Error: {path}: {message} {location}")]
    RequestInput {
        path: PathBuf,
        message: String,
        location: ErrorLocation,
    },

    #[error("Output Error: {message} {location}")]
    Output {
        message: String,
        location: ErrorLocation,
    },
}

impl ServerError {
    #[track_caller]
    pub fn startup(message: impl Into<String>) -> Self {
        ServerError::Startup {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn logger(message: impl Into<String>) -> Self {
        ServerError::Logger {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for ServerError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        ServerError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<CoreError> for ServerError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Config(e) => ServerError::from(e),
            other => ServerError::startup(other.to_string()),
        }
    }
}
