use crate::helpers::{ACCESS_TOKEN, fragments, platform_handler};

use extension_core::auth::Token;
use extension_core::catalog::ErrorCode;
use extension_core::error::HandlerError;
use extension_core::processor::{Request, RequestMethod};
use extension_core::resolver::{Handler, HandlerContext, ResultStatus};
use extension_core::validation::{CLUSTER_CREATE_RULES, STANDARD_VALIDATION_ROUTES};

use common::HttpStatusCode;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(server: &MockServer, version: &str, resource_path: &str) -> HandlerContext {
    HandlerContext {
        request_id: "req-1".to_string(),
        version: version.to_string(),
        fragments: fragments(server),
        resource_path: resource_path.to_string(),
        token: Some(Token::new(ACCESS_TOKEN, None)),
    }
}

/// **VALUE**: Forwarded calls carry the bearer token, the versioned `Accept`
/// header and the inbound query.
///
/// **WHY THIS MATTERS**: The platform picks its response schema from the
/// `Accept` version; a missing version silently returns the oldest schema.
///
/// **BUG THIS CATCHES**: Would catch the query string being dropped or the
/// version header being sent without its `version=` parameter.
#[tokio::test]
async fn given_get_request_when_forwarded_then_headers_and_query_sent() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cse/35.0/clusters"))
        .and(query_param("org", "acme"))
        .and(header("Authorization", "Bearer integration-token"))
        .and(header("Accept", "application/json;version=35.0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"name": "c1"}, {"name": "c2"}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    let request = Request::new(RequestMethod::Get, "/api/cse/35.0/clusters").with_query("org=acme");

    // WHEN
    let outcome = platform_handler()
        .handle(&context(&server, "35.0", "clusters"), &request)
        .await
        .expect("outcome");

    // THEN
    assert_eq!(outcome.status, ResultStatus::Ok);
    assert_eq!(outcome.items, vec![json!({"name": "c1"}), json!({"name": "c2"})]);
}

#[tokio::test]
async fn given_post_with_body_when_forwarded_then_created_with_single_item() {
    let server = MockServer::start().await;
    let body = json!({"cluster_name": "c1"});
    Mock::given(method("POST"))
        .and(path("/api/cse/36.0/clusters"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"task": "t-1"})))
        .expect(1)
        .mount(&server)
        .await;
    let request = Request::new(RequestMethod::Post, "/api/cse/36.0/clusters").with_body(body);

    let outcome = platform_handler()
        .handle(&context(&server, "36.0", "clusters"), &request)
        .await
        .expect("outcome");

    assert_eq!(outcome.status, ResultStatus::Created);
    assert_eq!(outcome.items, vec![json!({"task": "t-1"})]);
}

#[tokio::test]
async fn given_accepted_without_body_when_forwarded_then_acknowledged() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/cse/35.0/clusters/c1"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;
    let request = Request::new(RequestMethod::Delete, "/api/cse/35.0/clusters/c1");

    let outcome = platform_handler()
        .handle(&context(&server, "35.0", "clusters/c1"), &request)
        .await
        .expect("outcome");

    assert_eq!(outcome.status, ResultStatus::Accepted);
    assert!(outcome.items.is_empty());
}

/// **VALUE**: Platform failures keep their status and the platform's message.
///
/// **BUG THIS CATCHES**: Would catch every platform failure collapsing into a
/// 500, which hides "not found" from the client.
#[tokio::test]
async fn given_platform_failure_when_forwarded_then_platform_error_with_message() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Cluster c9 not found"})),
        )
        .mount(&server)
        .await;
    let request = Request::new(RequestMethod::Get, "/api/cse/35.0/clusters/c9");

    // WHEN
    let err = platform_handler()
        .handle(&context(&server, "35.0", "clusters/c9"), &request)
        .await
        .unwrap_err();

    // THEN
    assert_eq!(err.status_code(), HttpStatusCode::NOT_FOUND);
    assert_eq!(err.error_code(), ErrorCode::PLATFORM_REQUEST_FAILED);
    assert_eq!(err.detail(), "Cluster c9 not found");
}

#[tokio::test]
async fn given_validation_rules_when_body_incomplete_then_rejected_before_forwarding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let handler =
        platform_handler().with_validation(RequestMethod::Post, "clusters", CLUSTER_CREATE_RULES);
    let request = Request::new(RequestMethod::Post, "/api/cse/35.0/clusters")
        .with_body(json!({"org_name": "acme"}));

    let err = handler
        .handle(&context(&server, "35.0", "clusters"), &request)
        .await
        .unwrap_err();

    assert!(matches!(err, HandlerError::Validation { .. }));
    assert_eq!(err.error_code(), ErrorCode::CLUSTER_CREATE_CLUSTER_NAME_MISSING);
}

/// **VALUE**: Rules bound to cluster creation leave other POST operations alone.
///
/// **WHY THIS MATTERS**: One handler forwards every resource of every version.
/// A rule set keyed by method alone would reject valid compute-policy calls
/// with cluster-create codes.
///
/// **BUG THIS CATCHES**: Would catch routes matching on the HTTP method without
/// looking at the resource path.
#[tokio::test]
async fn given_cluster_rules_when_posting_compute_policy_then_forwarded_unchecked() {
    // GIVEN: Cluster-create rules on POST clusters only
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cse/35.0/ovdc/abc/compute-policies"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    let handler =
        platform_handler().with_validation(RequestMethod::Post, "clusters", CLUSTER_CREATE_RULES);
    let request = Request::new(RequestMethod::Post, "/api/cse/35.0/ovdc/abc/compute-policies")
        .with_body(json!({
            "ovdc_id": "abc",
            "compute_policy_action": "add",
            "compute_policy_name": "p"
        }));

    // WHEN
    let outcome = handler
        .handle(&context(&server, "35.0", "ovdc/abc/compute-policies"), &request)
        .await
        .unwrap();

    // THEN: Forwarded, no cluster_name demanded
    assert_eq!(outcome.status, ResultStatus::Accepted);
}

/// **VALUE**: Path placeholders count as payload keys.
///
/// **BUG THIS CATCHES**: Would catch `ovdc_id` being reported missing when it
/// sits in the URL rather than the body.
#[tokio::test]
async fn given_standard_routes_when_policy_update_lacks_name_then_policy_code() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let handler =
        platform_handler().with_validation_routes(STANDARD_VALIDATION_ROUTES.iter().copied());
    let request = Request::new(RequestMethod::Put, "/api/cse/35.0/ovdc/abc/compute-policies")
        .with_body(json!({"compute_policy_action": "add"}));

    // WHEN
    let err = handler
        .handle(&context(&server, "35.0", "ovdc/abc/compute-policies"), &request)
        .await
        .unwrap_err();

    // THEN
    assert_eq!(
        err.error_code(),
        ErrorCode::OVDC_COMPUTE_POLICY_UPDATE_COMPUTE_POLICY_NAME_MISSING
    );
    assert!(err.detail().contains("compute_policy_name"));
    assert!(!err.detail().contains("ovdc_id"));
}

#[tokio::test]
async fn given_unreachable_platform_when_forwarded_then_transport_error() {
    let server = MockServer::start().await;
    let ctx = context(&server, "35.0", "clusters");
    drop(server);
    let request = Request::new(RequestMethod::Get, "/api/cse/35.0/clusters");

    let err = platform_handler().handle(&ctx, &request).await.unwrap_err();

    assert!(matches!(err, HandlerError::Transport { .. }));
    assert_eq!(err.status_code(), HttpStatusCode::INTERNAL_SERVER_ERROR);
}
