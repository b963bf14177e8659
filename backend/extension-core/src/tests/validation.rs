use crate::catalog::ErrorCode;
use crate::error::HandlerError;
use crate::processor::RequestMethod;
use crate::validation::{
    CLUSTER_CREATE_RULES, KeyRule, OVDC_UPDATE_RULES, RequestKey, STANDARD_VALIDATION_ROUTES,
    ValidationRoute, validate_payload,
};

use serde_json::json;

fn code_and_message(err: HandlerError) -> (ErrorCode, String) {
    match err {
        HandlerError::Validation {
            error_code,
            message,
            ..
        } => (error_code, message),
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn given_complete_cluster_payload_when_validated_then_ok() {
    let body = json!({
        "cluster_name": "c1",
        "org_name": "org",
        "ovdc_name": "vdc",
        "network_name": "net",
        "num_workers": 2
    });

    assert!(validate_payload(Some(&body), CLUSTER_CREATE_RULES).is_ok());
}

/// **VALUE**: The error code belongs to the first missing key in rule order.
///
/// **BUG THIS CATCHES**: Would catch hash-order iteration making the reported
/// code differ between runs for the same payload.
#[test]
fn given_payload_missing_several_keys_when_validated_then_first_rule_code() {
    // GIVEN: cluster_name and num_workers missing
    let body = json!({"org_name": "org", "ovdc_name": "vdc", "network_name": "net"});

    // WHEN
    let err = validate_payload(Some(&body), CLUSTER_CREATE_RULES).unwrap_err();

    // THEN
    let (code, message) = code_and_message(err);
    assert_eq!(code, ErrorCode::CLUSTER_CREATE_CLUSTER_NAME_MISSING);
    assert_eq!(
        message,
        "Missing required keys in request payload: [cluster_name, num_workers]"
    );
}

#[test]
fn given_null_value_with_invalid_code_when_validated_then_invalid_code() {
    let body = json!({
        "cluster_name": "c1",
        "org_name": "org",
        "ovdc_name": "vdc",
        "network_name": null,
        "num_workers": 2
    });

    let (code, message) =
        code_and_message(validate_payload(Some(&body), CLUSTER_CREATE_RULES).unwrap_err());

    assert_eq!(code, ErrorCode::CLUSTER_CREATE_NETWORK_NAME_INVALID);
    assert!(message.contains("network_name"));
}

#[test]
fn given_null_value_without_invalid_code_when_validated_then_default_code() {
    let body = json!({
        "org_name": null,
        "ovdc_name": "vdc",
        "k8s_provider": "native",
        "ovdc_id": "id",
        "pks_plan_name": "plan",
        "pks_cluster_domain": "example.com"
    });

    let (code, _) =
        code_and_message(validate_payload(Some(&body), OVDC_UPDATE_RULES).unwrap_err());

    assert_eq!(code, ErrorCode::DEFAULT);
}

/// **VALUE**: A missing or non-object body counts as "every key missing".
///
/// **BUG THIS CATCHES**: Would catch a POST without a body passing validation
/// and reaching the platform.
#[test]
fn given_absent_or_non_object_body_when_validated_then_all_missing() {
    let rules = [KeyRule::missing_only(
        RequestKey::OvdcId,
        ErrorCode::OVDC_INFO_OVDC_ID_MISSING,
    )];

    for body in [None, Some(json!([1, 2])), Some(json!("text"))] {
        let (code, _) = code_and_message(validate_payload(body.as_ref(), &rules).unwrap_err());
        assert_eq!(code, ErrorCode::OVDC_INFO_OVDC_ID_MISSING);
    }
}

#[test]
fn given_no_rules_when_validated_then_ok() {
    assert!(validate_payload(None, &[]).is_ok());
}

#[test]
fn given_placeholder_route_when_path_matches_then_segment_captured() {
    let route = ValidationRoute::new(RequestMethod::Put, "ovdc/{ovdc_id}", OVDC_UPDATE_RULES);

    let captured = route.capture(RequestMethod::Put, "OVDC/vdc-7").unwrap();

    assert_eq!(captured.get("ovdc_id"), Some(&json!("vdc-7")));
}

/// **VALUE**: A route applies only to its own method and path shape.
///
/// **BUG THIS CATCHES**: Would catch prefix matching, where `clusters` also
/// claims `clusters/c1/config`.
#[test]
fn given_route_when_method_or_shape_differs_then_no_match() {
    // GIVEN
    let route = ValidationRoute::new(RequestMethod::Post, "clusters", CLUSTER_CREATE_RULES);

    // WHEN / THEN
    assert!(route.capture(RequestMethod::Post, "clusters").is_some());
    assert!(route.capture(RequestMethod::Put, "clusters").is_none());
    assert!(route.capture(RequestMethod::Post, "clusters/c1/config").is_none());
    assert!(route.capture(RequestMethod::Post, "ovdc/abc/compute-policies").is_none());
}

#[test]
fn given_body_and_capture_when_validated_then_body_value_wins() {
    let route = ValidationRoute::new(RequestMethod::Put, "ovdc/{ovdc_id}", OVDC_UPDATE_RULES);
    let captured = route.capture(RequestMethod::Put, "ovdc/abc").unwrap();
    let body = json!({
        "org_name": "org",
        "ovdc_name": "vdc",
        "k8s_provider": "native",
        "ovdc_id": null,
        "pks_plan_name": "plan",
        "pks_cluster_domain": "example.com"
    });

    let err = route.validate(captured, Some(&body)).unwrap_err();

    let (code, message) = code_and_message(err);
    assert_eq!(code, ErrorCode::DEFAULT);
    assert!(message.contains("ovdc_id"));
}

#[test]
fn given_standard_routes_when_listed_then_each_method_and_pattern_unique() {
    for (i, a) in STANDARD_VALIDATION_ROUTES.iter().enumerate() {
        for b in &STANDARD_VALIDATION_ROUTES[i + 1..] {
            assert!(
                !(a.method == b.method && a.pattern == b.pattern),
                "duplicate route {} {}",
                a.method.as_str(),
                a.pattern
            );
        }
    }
}
