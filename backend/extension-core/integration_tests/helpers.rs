//! Shared fixtures for the integration tests.
//!
//! One `MockServer` plays both the identity provider (`/oauth/token`) and the
//! platform (`/api/...`).

use extension_core::auth::{Credential, OAuthTokenProvider, TokenProvider};
use extension_core::catalog::ErrorCatalog;
use extension_core::platform::PlatformHandler;
use extension_core::processor::{RequestProcessor, RetryPolicy};
use extension_core::resolver::{Handler, UriFragments, VersionedClientResolver};

use common::RedactedSecret;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "extension-client";
pub const CLIENT_SECRET: &str = "s3cr3t";
/// base64("extension-client:s3cr3t")
pub const BASIC_HEADER: &str = "Basic ZXh0ZW5zaW9uLWNsaWVudDpzM2NyM3Q=";
pub const ACCESS_TOKEN: &str = "integration-token";
pub const TOKEN_PATH: &str = "/oauth/token";

pub const FAST_RETRY: RetryPolicy = RetryPolicy {
    max_retries: 1,
    initial_delay: Duration::from_millis(1),
    max_delay: Duration::from_millis(5),
};

pub fn credential(server: &MockServer) -> Credential {
    Credential::new(server.uri(), CLIENT_ID, RedactedSecret::new(CLIENT_SECRET))
}

pub fn fragments(server: &MockServer) -> UriFragments {
    UriFragments::new(format!("{}/api", server.uri()), "cse")
}

pub fn token_provider() -> OAuthTokenProvider {
    OAuthTokenProvider::new(Duration::from_secs(5), None).expect("token provider")
}

/// Identity provider that issues [`ACCESS_TOKEN`].
pub async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

/// Processor with `handler` bound to versions 35.0 and 36.0.
pub fn processor(server: &MockServer, handler: Arc<dyn Handler>) -> RequestProcessor {
    let resolver = VersionedClientResolver::new([
        ("35.0", Arc::clone(&handler)),
        ("36.0", handler),
    ])
    .expect("resolver");
    let provider: Arc<dyn TokenProvider> = Arc::new(token_provider());

    RequestProcessor::new(
        Arc::new(resolver),
        Arc::new(ErrorCatalog::standard().expect("catalog")),
        provider,
        credential(server),
        fragments(server),
    )
    .with_retry_policy(FAST_RETRY)
}

pub fn platform_handler() -> PlatformHandler {
    PlatformHandler::new(Duration::from_secs(5), None).expect("platform handler")
}
