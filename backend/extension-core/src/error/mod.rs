pub mod auth;
pub mod catalog;
pub mod config;
pub mod handler;
pub mod platform;
pub mod resolver;

pub use auth::AuthError;
pub use catalog::CatalogError;
pub use config::ConfigError;
pub use handler::HandlerError;
pub use platform::PlatformError;
pub use resolver::ResolveError;

use thiserror::Error;

/// Startup-time failures: everything that can go wrong before the first
/// request is processed. Per-request failures never surface as `CoreError`;
/// the processor turns them into response envelopes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
