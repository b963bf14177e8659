//! Wiring: config in, [`RequestProcessor`] out.

use crate::cli::RequestSource;
use crate::error::ServerError;

use extension_core::auth::{OAuthTokenProvider, TokenCache, TokenProvider};
use extension_core::catalog::ErrorCatalog;
use extension_core::config::ExtensionConfig;
use extension_core::error::CoreError;
use extension_core::platform::PlatformHandler;
use extension_core::processor::{RequestProcessor, Response};
use extension_core::resolver::{Handler, VersionedClientResolver};
use extension_core::validation::STANDARD_VALIDATION_ROUTES;

use common::ErrorLocation;

use std::io::Read;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;

use log::info;

/// Build the processor described by `config`.
///
/// Every configured version is served by one shared [`PlatformHandler`]
/// that checks payloads against [`STANDARD_VALIDATION_ROUTES`].
///
/// # Errors
///
/// Returns [`ServerError`] if the catalog, the HTTP clients, the resolver
/// table or the credential cannot be built.
pub fn build_processor(config: &ExtensionConfig) -> Result<RequestProcessor, ServerError> {
    let catalog = ErrorCatalog::standard().map_err(CoreError::from)?;

    let handler: Arc<dyn Handler> = Arc::new(
        PlatformHandler::new(config.request_timeout(), None)
            .map_err(CoreError::from)?
            .with_validation_routes(STANDARD_VALIDATION_ROUTES.iter().copied()),
    );
    let resolver = VersionedClientResolver::new(
        config
            .platform
            .versions
            .iter()
            .map(|version| (version.clone(), Arc::clone(&handler))),
    )
    .map_err(CoreError::from)?;

    let oauth = OAuthTokenProvider::new(
        config.identity_timeout(),
        config.identity.proxy_url.as_deref(),
    )
    .map_err(CoreError::from)?;
    let token_provider: Arc<dyn TokenProvider> = if config.processor.token_cache {
        info!("Token cache enabled");
        Arc::new(TokenCache::new(
            Arc::new(oauth),
            config.processor.default_token_ttl(),
            config.processor.refresh_skew(),
        ))
    } else {
        Arc::new(oauth)
    };

    info!(
        "Serving API versions [{}] under {}/{}",
        resolver.supported_versions().join(", "),
        config.platform.api_root.trim_end_matches('/'),
        config.platform.extension_fragment.trim_matches('/')
    );

    Ok(RequestProcessor::new(
        Arc::new(resolver),
        Arc::new(catalog),
        token_provider,
        config.credential()?,
        config.uri_fragments(),
    )
    .with_retry_policy(config.processor.retry_policy()))
}

/// Read the raw request document.
pub fn read_request(source: &RequestSource) -> Result<Vec<u8>, ServerError> {
    match source {
        RequestSource::Stdin => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|e| ServerError::RequestInput {
                    path: PathBuf::from("<stdin>"),
                    message: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            Ok(buffer)
        }
        RequestSource::File(path) => std::fs::read(path).map_err(|e| ServerError::RequestInput {
            path: path.clone(),
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// Process one raw document and serialize the envelope.
pub async fn respond(processor: &RequestProcessor, raw: &[u8]) -> Result<String, ServerError> {
    let response: Response = processor.process_raw(raw).await;
    response.to_json().map_err(|e| ServerError::Output {
        message: format!("Failed to serialize response: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}
