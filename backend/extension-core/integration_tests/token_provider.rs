use crate::helpers::{
    ACCESS_TOKEN, BASIC_HEADER, TOKEN_PATH, credential, mount_token_endpoint, token_provider,
};

use extension_core::auth::{OAuthTokenProvider, TokenProvider};
use extension_core::error::auth::{
    REASON_INVALID_CREDENTIALS, REASON_MALFORMED_RESPONSE, REASON_TIMEOUT, REASON_TRANSPORT,
};

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// **VALUE**: The exchange is exactly the client-credentials call the identity
/// provider expects.
///
/// **WHY THIS MATTERS**: The provider rejects anything else with a 400 that
/// looks like an outage from our side.
///
/// **BUG THIS CATCHES**: Would catch a JSON body instead of a form body, a
/// missing `Cache-Control`, or a wrongly encoded Basic header.
#[tokio::test]
async fn given_identity_provider_when_acquiring_token_then_client_credentials_request_sent() {
    // GIVEN: A provider that only answers the exact expected request
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("Authorization", BASIC_HEADER))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(header("Cache-Control", "no-cache"))
        .and(body_string("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": 120
        })))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN
    let token = token_provider()
        .acquire_token(&credential(&server))
        .await
        .expect("token");

    // THEN
    assert_eq!(token.access_token(), ACCESS_TOKEN);
    assert_eq!(token.expires_in(), Some(Duration::from_secs(120)));
}

#[tokio::test]
async fn given_success_without_access_token_when_acquiring_then_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&server)
        .await;

    let err = token_provider()
        .acquire_token(&credential(&server))
        .await
        .unwrap_err();

    assert_eq!(err.reason(), REASON_MALFORMED_RESPONSE);
}

#[tokio::test]
async fn given_idp_rejects_client_when_acquiring_then_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let err = token_provider()
        .acquire_token(&credential(&server))
        .await
        .unwrap_err();

    assert_eq!(err.reason(), REASON_INVALID_CREDENTIALS);
    assert_eq!(err.status_code(), Some(401));
}

#[tokio::test]
async fn given_idp_server_error_when_acquiring_then_retryable_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = token_provider()
        .acquire_token(&credential(&server))
        .await
        .unwrap_err();

    assert_eq!(err.reason(), REASON_TRANSPORT);
    assert!(err.is_retryable());
}

/// **VALUE**: A slow identity provider surfaces as a timeout, not a hang.
///
/// **BUG THIS CATCHES**: Would catch the timeout being dropped from the client
/// and a request blocking until the platform gives up on the extension.
#[tokio::test]
async fn given_slow_idp_when_acquiring_then_timeout() {
    // GIVEN: The provider answers after 2s, the exchange allows 200ms
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": ACCESS_TOKEN}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let provider =
        OAuthTokenProvider::new(Duration::from_millis(200), None).expect("token provider");

    // WHEN
    let err = provider
        .acquire_token(&credential(&server))
        .await
        .unwrap_err();

    // THEN
    assert_eq!(err.reason(), REASON_TIMEOUT);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn given_unreachable_idp_when_acquiring_then_transport_failure() {
    // GIVEN: A server that is shut down before the call
    let server = MockServer::start().await;
    let credential = credential(&server);
    drop(server);

    let err = token_provider().acquire_token(&credential).await.unwrap_err();

    assert_eq!(err.reason(), REASON_TRANSPORT);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn given_stateless_provider_when_acquiring_twice_then_two_exchanges() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    let provider = token_provider();
    let credential = credential(&server);

    provider.acquire_token(&credential).await.expect("first");
    provider.acquire_token(&credential).await.expect("second");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 2);
}
