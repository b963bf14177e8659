use crate::catalog::ErrorCode;
use crate::error::HandlerError;

use common::HttpStatusCode;

#[test]
fn given_validation_error_when_classified_then_400_with_its_code() {
    let err = HandlerError::validation(
        ErrorCode::CLUSTER_CREATE_CLUSTER_NAME_MISSING,
        "cluster_name missing",
    );

    assert_eq!(err.status_code(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(err.error_code(), ErrorCode::CLUSTER_CREATE_CLUSTER_NAME_MISSING);
    assert_eq!(err.detail(), "cluster_name missing");
}

/// **VALUE**: Internal errors never expose their message as a response detail.
///
/// **BUG THIS CATCHES**: Would catch a stack of internal context (paths, SQL,
/// upstream bodies) leaking to the client through `detail()`.
#[test]
fn given_internal_error_when_detail_then_empty() {
    // GIVEN
    let err = HandlerError::internal("db connection string postgres://user:pw@host");

    // THEN
    assert_eq!(err.detail(), "");
    assert_eq!(err.error_code(), ErrorCode::DEFAULT);
    assert_eq!(err.status_code(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert!(err.is_internal());
    assert!(err.to_string().contains("postgres://"));
}

#[test]
fn given_platform_error_when_classified_then_passes_status_through() {
    let err = HandlerError::platform(404, "cluster not found");

    assert_eq!(err.status_code(), HttpStatusCode::NOT_FOUND);
    assert_eq!(err.error_code(), ErrorCode::PLATFORM_REQUEST_FAILED);
    assert!(!err.is_token_rejection());
    assert!(HandlerError::platform(401, "expired").is_token_rejection());
}

#[test]
fn given_rejected_error_without_code_when_classified_then_default_code() {
    let err = HandlerError::rejected(HttpStatusCode::FORBIDDEN, None, "not allowed");

    assert_eq!(err.status_code(), HttpStatusCode::FORBIDDEN);
    assert_eq!(err.error_code(), ErrorCode::DEFAULT);
    assert_eq!(err.detail(), "not allowed");
}

#[test]
fn given_json_error_when_converted_then_internal() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

    let err = HandlerError::from(json_err);

    assert!(err.is_internal());
}
