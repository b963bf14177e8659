//! Shared leaf types for the extension workspace.
//!
//! Nothing in here knows about tokens, versions or handlers. These are the
//! building blocks every other crate leans on:
//!
//! - [`ErrorLocation`]: call-site capture carried by every error variant
//! - [`HttpStatusCode`]: status newtype with the named codes the core produces
//! - [`RedactedSecret`]: secret string that never prints, serializes, or lingers

pub mod error;
pub mod http_status;
pub mod redacted_secret;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_secret::RedactedSecret;

#[cfg(test)]
mod tests;
