use crate::ErrorLocation;

use thiserror::Error as ThisError;

/// Raised when code tries to push a redacted value through serde.
#[derive(Debug, ThisError)]
pub enum RedactError {
    #[error("Serialization Error: {label} refuses to serialize, read it explicitly {location}")]
    Serialization {
        label: &'static str,
        location: ErrorLocation,
    },
}
