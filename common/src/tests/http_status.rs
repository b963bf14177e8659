use crate::HttpStatusCode;

#[test]
fn given_named_codes_when_classified_then_match_their_ranges() {
    assert!(HttpStatusCode::OK.is_success());
    assert!(HttpStatusCode::CREATED.is_success());
    assert!(HttpStatusCode::ACCEPTED.is_success());
    assert!(HttpStatusCode::BAD_REQUEST.is_client_error());
    assert!(HttpStatusCode::INTERNAL_SERVER_ERROR.is_server_error());
    assert!(!HttpStatusCode::INTERNAL_SERVER_ERROR.is_retryable());
}

/// **VALUE**: 401 and 403 are the only statuses treated as credential rejection.
///
/// **BUG THIS CATCHES**: Would catch a range check sneaking in that makes a 404
/// from the identity provider look like bad credentials.
#[test]
fn given_auth_statuses_when_checked_then_only_401_and_403_are_rejections() {
    assert!(HttpStatusCode::UNAUTHORIZED.is_auth_rejection());
    assert!(HttpStatusCode::FORBIDDEN.is_auth_rejection());
    assert!(!HttpStatusCode::NOT_FOUND.is_auth_rejection());
    assert!(!HttpStatusCode::OK.is_auth_rejection());
}

#[test]
fn given_status_code_when_serialized_then_is_bare_number() {
    let json = serde_json::to_string(&HttpStatusCode::ACCEPTED).unwrap();
    assert_eq!(json, "202");

    let parsed: HttpStatusCode = serde_json::from_str("418").unwrap();
    assert_eq!(parsed, HttpStatusCode(418));
}
