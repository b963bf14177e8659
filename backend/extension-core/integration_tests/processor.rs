use crate::helpers::{
    ACCESS_TOKEN, TOKEN_PATH, mount_token_endpoint, platform_handler, processor,
};

use extension_core::catalog::ErrorCode;
use extension_core::processor::{Request, RequestMethod};
use extension_core::validation::CLUSTER_CREATE_RULES;

use common::HttpStatusCode;

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_cluster_list(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/api/cse/35.0/clusters"))
        .and(header("Authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "c1"}])))
        .expect(expected)
        .mount(server)
        .await;
}

/// **VALUE**: End to end, a supported version with valid credentials yields
/// the platform's items in a 200 envelope.
///
/// **BUG THIS CATCHES**: Would catch any break in the chain from version
/// extraction through token exchange to forwarding.
#[tokio::test]
async fn given_supported_version_and_valid_credentials_when_processing_then_200_with_items() {
    // GIVEN
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    mount_cluster_list(&server, 1).await;
    let processor = processor(&server, Arc::new(platform_handler()));

    // WHEN
    let response = processor
        .process(&Request::new(RequestMethod::Get, "/api/cse/35.0/clusters"))
        .await;

    // THEN
    let json: Value = serde_json::to_value(&response).expect("json");
    assert_eq!(json, json!({"statusCode": 200, "body": [{"name": "c1"}]}));
}

#[tokio::test]
async fn given_unknown_version_when_processing_then_400_unsupported_and_no_calls() {
    let server = MockServer::start().await;
    let processor = processor(&server, Arc::new(platform_handler()));

    let response = processor
        .process(&Request::new(RequestMethod::Get, "/api/cse/9.9/clusters"))
        .await;

    assert_eq!(response.status_code, HttpStatusCode::BAD_REQUEST);
    assert_eq!(
        response.error_code(),
        Some(ErrorCode::REQUEST_API_VERSION_UNSUPPORTED)
    );
    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty(), "neither IdP nor platform may be called");
}

/// **VALUE**: A rejected credential becomes a 401 and the platform is never
/// contacted.
///
/// **BUG THIS CATCHES**: Would catch the processor calling the platform with
/// no token after an auth failure.
#[tokio::test]
async fn given_idp_rejects_credentials_when_processing_then_401_invalid_credentials() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_cluster_list(&server, 0).await;
    let processor = processor(&server, Arc::new(platform_handler()));

    // WHEN
    let response = processor
        .process(&Request::new(RequestMethod::Get, "/api/cse/35.0/clusters"))
        .await;

    // THEN
    assert_eq!(response.status_code, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some(ErrorCode::AUTH_INVALID_CREDENTIALS));
}

#[tokio::test]
async fn given_missing_cluster_name_when_creating_then_400_with_detail() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/cse/35.0/clusters"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let handler =
        platform_handler().with_validation(RequestMethod::Post, "clusters", CLUSTER_CREATE_RULES);
    let processor = processor(&server, Arc::new(handler));
    let request = Request::new(RequestMethod::Post, "/api/cse/35.0/clusters").with_body(json!({
        "org_name": "acme",
        "ovdc_name": "vdc",
        "network_name": "net",
        "num_workers": 1
    }));

    let response = processor.process(&request).await;

    assert_eq!(response.status_code, HttpStatusCode::BAD_REQUEST);
    assert_eq!(
        response.error_code(),
        Some(ErrorCode::CLUSTER_CREATE_CLUSTER_NAME_MISSING)
    );
    assert!(response.detail().is_some_and(|detail| detail.contains("cluster_name")));
}

#[tokio::test]
async fn given_idp_down_when_processing_then_retried_then_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    let processor = processor(&server, Arc::new(platform_handler()));

    let response = processor
        .process(&Request::new(RequestMethod::Get, "/api/cse/35.0/clusters"))
        .await;

    assert_eq!(response.status_code, HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.error_code(),
        Some(ErrorCode::AUTH_TOKEN_ACQUISITION_FAILED)
    );
}

#[tokio::test]
async fn given_version_in_accept_header_when_processing_raw_then_routed() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    mount_cluster_list(&server, 1).await;
    let processor = processor(&server, Arc::new(platform_handler()));
    let raw = json!({
        "id": "raw-1",
        "method": "GET",
        "path": "/api/cse/clusters",
        "headers": {"Accept": "application/json;version=35.0"}
    })
    .to_string();

    let response = processor.process_raw(raw.as_bytes()).await;

    assert_eq!(response.status_code, HttpStatusCode::OK);
    assert_eq!(response.body, vec![json!({"name": "c1"})]);
}
