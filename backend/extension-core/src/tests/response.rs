use crate::catalog::ErrorCode;
use crate::processor::Response;

use common::HttpStatusCode;

use serde_json::{Value, json};

/// **VALUE**: Success and failure envelopes have disjoint shapes.
///
/// **WHY THIS MATTERS**: The platform decides success vs failure by the
/// presence of `errorCode`; a success envelope carrying one would be shown as
/// an error.
///
/// **BUG THIS CATCHES**: Would catch serde defaults emitting `"errorCode":
/// null` or an empty `"body": []` on failures.
#[test]
fn given_success_and_failure_when_serialized_then_shapes_differ() {
    // GIVEN
    let ok = Response::success(HttpStatusCode::OK, vec![json!({"name": "c1"})]);
    let failed = Response::failure(
        HttpStatusCode::BAD_REQUEST,
        ErrorCode::REQUEST_API_VERSION_UNSUPPORTED,
        "Invalid api version",
    );

    // WHEN
    let ok_json: Value = serde_json::from_str(&ok.to_json().unwrap()).unwrap();
    let failed_json: Value = serde_json::from_str(&failed.to_json().unwrap()).unwrap();

    // THEN
    assert_eq!(ok_json, json!({"statusCode": 200, "body": [{"name": "c1"}]}));
    assert_eq!(
        failed_json,
        json!({"statusCode": 400, "errorCode": 4001, "detail": "Invalid api version"})
    );
}

#[test]
fn given_empty_success_when_serialized_then_body_is_empty_array() {
    let ok = Response::success(HttpStatusCode::ACCEPTED, Vec::new());

    let json: Value = serde_json::to_value(&ok).unwrap();

    assert_eq!(json, json!({"statusCode": 202, "body": []}));
    assert!(ok.is_success());
    assert_eq!(ok.error_code(), None);
}

#[test]
fn given_failure_when_inspected_then_accessors_report_error() {
    let failed = Response::failure(HttpStatusCode::UNAUTHORIZED, ErrorCode(4004), "denied");

    assert!(!failed.is_success());
    assert_eq!(failed.error_code(), Some(ErrorCode::AUTH_INVALID_CREDENTIALS));
    assert_eq!(failed.detail(), Some("denied"));
    assert!(failed.body.is_empty());
}
