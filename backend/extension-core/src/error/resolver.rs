use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ResolveError {
    #[error("Unsupported Version Error: '{requested}' (supported: {}) {location}", .supported.join(", "))]
    UnsupportedVersion {
        requested: String,
        supported: Vec<String>,
        location: ErrorLocation,
    },

    #[error("Duplicate Version Error: '{version}' registered twice {location}")]
    DuplicateVersion {
        version: String,
        location: ErrorLocation,
    },

    #[error("Empty Version Error: version identifier must not be empty {location}")]
    EmptyVersion { location: ErrorLocation },
}

impl ResolveError {
    #[track_caller]
    pub fn unsupported(requested: impl Into<String>, supported: Vec<String>) -> Self {
        ResolveError::UnsupportedVersion {
            requested: requested.into(),
            supported,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn duplicate(version: impl Into<String>) -> Self {
        ResolveError::DuplicateVersion {
            version: version.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn empty() -> Self {
        ResolveError::EmptyVersion {
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
