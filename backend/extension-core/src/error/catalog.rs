use common::ErrorLocation;

use thiserror::Error as ThisError;

/// Load-time catalog invariant violations. A process that hits one of these
/// has a broken code table and must not start.
#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("Duplicate Code Error: {code} used by both '{first}' and '{second}' {location}")]
    DuplicateCode {
        code: i32,
        first: &'static str,
        second: &'static str,
        location: ErrorLocation,
    },

    #[error("Duplicate Name Error: '{name}' registered twice {location}")]
    DuplicateName {
        name: &'static str,
        location: ErrorLocation,
    },
}
