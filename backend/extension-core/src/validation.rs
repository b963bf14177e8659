//! Required-key checks for request payloads.
//!
//! A [`KeyRule`] ties a [`RequestKey`] to the catalog codes reported when the
//! key is absent or `null`. Each operation owns a rule set, e.g.
//! [`CLUSTER_CREATE_RULES`], and a [`ValidationRoute`] scopes a rule set to
//! one method and resource path.

use crate::catalog::ErrorCode;
use crate::error::HandlerError;
use crate::processor::RequestMethod;

use serde_json::{Map, Value};

/// Keys a client may put in a request payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKey {
    ClusterName,
    OrgName,
    OvdcName,
    NetworkName,
    NumWorkers,
    OvdcId,
    ComputePolicyAction,
    ComputePolicyName,
    K8sProvider,
    PksPlanName,
    PksClusterDomain,
}

impl RequestKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKey::ClusterName => "cluster_name",
            RequestKey::OrgName => "org_name",
            RequestKey::OvdcName => "ovdc_name",
            RequestKey::NetworkName => "network_name",
            RequestKey::NumWorkers => "num_workers",
            RequestKey::OvdcId => "ovdc_id",
            RequestKey::ComputePolicyAction => "compute_policy_action",
            RequestKey::ComputePolicyName => "compute_policy_name",
            RequestKey::K8sProvider => "k8s_provider",
            RequestKey::PksPlanName => "pks_plan_name",
            RequestKey::PksClusterDomain => "pks_cluster_domain",
        }
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRule {
    pub key: RequestKey,
    pub missing: ErrorCode,
    /// Reported for a `null` value. `None` falls back to [`ErrorCode::DEFAULT`].
    pub invalid: Option<ErrorCode>,
}

impl KeyRule {
    pub const fn new(key: RequestKey, missing: ErrorCode, invalid: Option<ErrorCode>) -> Self {
        Self {
            key,
            missing,
            invalid,
        }
    }

    pub const fn missing_only(key: RequestKey, missing: ErrorCode) -> Self {
        Self::new(key, missing, None)
    }

    pub fn invalid_code(&self) -> ErrorCode {
        self.invalid.unwrap_or(ErrorCode::DEFAULT)
    }
}

pub const CLUSTER_CREATE_RULES: &[KeyRule] = &[
    KeyRule::new(
        RequestKey::ClusterName,
        ErrorCode::CLUSTER_CREATE_CLUSTER_NAME_MISSING,
        Some(ErrorCode::CLUSTER_CREATE_CLUSTER_NAME_INVALID),
    ),
    KeyRule::missing_only(RequestKey::OrgName, ErrorCode::CLUSTER_CREATE_ORG_NAME_MISSING),
    KeyRule::missing_only(RequestKey::OvdcName, ErrorCode::CLUSTER_CREATE_OVDC_NAME_MISSING),
    KeyRule::new(
        RequestKey::NetworkName,
        ErrorCode::CLUSTER_CREATE_NETWORK_NAME_MISSING,
        Some(ErrorCode::CLUSTER_CREATE_NETWORK_NAME_INVALID),
    ),
    KeyRule::new(
        RequestKey::NumWorkers,
        ErrorCode::CLUSTER_CREATE_NUM_WORKERS_MISSING,
        Some(ErrorCode::CLUSTER_CREATE_NUM_WORKERS_INVALID),
    ),
];

pub const OVDC_COMPUTE_POLICY_LIST_RULES: &[KeyRule] = &[KeyRule::missing_only(
    RequestKey::OvdcId,
    ErrorCode::OVDC_COMPUTE_POLICY_LIST_OVDC_ID_MISSING,
)];

pub const OVDC_COMPUTE_POLICY_UPDATE_RULES: &[KeyRule] = &[
    KeyRule::missing_only(
        RequestKey::OvdcId,
        ErrorCode::OVDC_COMPUTE_POLICY_UPDATE_OVDC_ID_MISSING,
    ),
    KeyRule::missing_only(
        RequestKey::ComputePolicyAction,
        ErrorCode::OVDC_COMPUTE_POLICY_UPDATE_COMPUTE_POLICY_ACTION_MISSING,
    ),
    KeyRule::missing_only(
        RequestKey::ComputePolicyName,
        ErrorCode::OVDC_COMPUTE_POLICY_UPDATE_COMPUTE_POLICY_NAME_MISSING,
    ),
];

pub const OVDC_INFO_RULES: &[KeyRule] = &[KeyRule::missing_only(
    RequestKey::OvdcId,
    ErrorCode::OVDC_INFO_OVDC_ID_MISSING,
)];

pub const OVDC_UPDATE_RULES: &[KeyRule] = &[
    KeyRule::missing_only(RequestKey::OrgName, ErrorCode::OVDC_UPDATE_ORG_NAME_MISSING),
    KeyRule::missing_only(RequestKey::OvdcName, ErrorCode::OVDC_UPDATE_OVDC_NAME_MISSING),
    KeyRule::missing_only(
        RequestKey::K8sProvider,
        ErrorCode::OVDC_UPDATE_K8S_PROVIDER_MISSING,
    ),
    KeyRule::missing_only(RequestKey::OvdcId, ErrorCode::OVDC_UPDATE_OVDC_ID_MISSING),
    KeyRule::missing_only(
        RequestKey::PksPlanName,
        ErrorCode::OVDC_UPDATE_PKS_PLAN_NAME_MISSING,
    ),
    KeyRule::missing_only(
        RequestKey::PksClusterDomain,
        ErrorCode::OVDC_UPDATE_PKS_CLUSTER_DOMAIN_MISSING,
    ),
];

/// A rule set bound to one operation.
///
/// `pattern` is matched segment by segment against the resource path after
/// the version. A `{key}` segment matches any value and contributes `key` to
/// the payload being validated; other segments match case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRoute {
    pub method: RequestMethod,
    pub pattern: &'static str,
    pub rules: &'static [KeyRule],
}

impl ValidationRoute {
    pub const fn new(
        method: RequestMethod,
        pattern: &'static str,
        rules: &'static [KeyRule],
    ) -> Self {
        Self {
            method,
            pattern,
            rules,
        }
    }

    /// Values captured by `{key}` segments, or `None` when the route does
    /// not apply.
    pub fn capture(
        &self,
        method: RequestMethod,
        resource_path: &str,
    ) -> Option<Map<String, Value>> {
        if method != self.method {
            return None;
        }

        let expected: Vec<&str> = self.pattern.split('/').filter(|s| !s.is_empty()).collect();
        let actual: Vec<&str> = resource_path.split('/').filter(|s| !s.is_empty()).collect();
        if expected.len() != actual.len() {
            return None;
        }

        let mut captured = Map::new();
        for (pattern, segment) in expected.iter().zip(&actual) {
            match pattern.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(key) => {
                    captured.insert(key.to_string(), Value::String(segment.to_string()));
                }
                None if pattern.eq_ignore_ascii_case(segment) => {}
                None => return None,
            }
        }
        Some(captured)
    }

    /// Validate `body` with the path captures filled in. Keys already in the
    /// body win over captured ones.
    ///
    /// # Errors
    ///
    /// [`HandlerError::Validation`] as for [`validate_payload`].
    #[track_caller]
    pub fn validate(
        &self,
        captured: Map<String, Value>,
        body: Option<&Value>,
    ) -> Result<(), HandlerError> {
        let mut payload = captured;
        if let Some(fields) = body.and_then(Value::as_object) {
            for (key, value) in fields {
                payload.insert(key.clone(), value.clone());
            }
        }
        validate_payload(Some(&Value::Object(payload)), self.rules)
    }
}

/// Rule sets for the operations the extension forwards.
pub const STANDARD_VALIDATION_ROUTES: &[ValidationRoute] = &[
    ValidationRoute::new(RequestMethod::Post, "clusters", CLUSTER_CREATE_RULES),
    ValidationRoute::new(
        RequestMethod::Get,
        "ovdc/{ovdc_id}/compute-policies",
        OVDC_COMPUTE_POLICY_LIST_RULES,
    ),
    ValidationRoute::new(
        RequestMethod::Put,
        "ovdc/{ovdc_id}/compute-policies",
        OVDC_COMPUTE_POLICY_UPDATE_RULES,
    ),
    ValidationRoute::new(RequestMethod::Get, "ovdc/{ovdc_id}", OVDC_INFO_RULES),
    ValidationRoute::new(RequestMethod::Put, "ovdc/{ovdc_id}", OVDC_UPDATE_RULES),
];

/// Check that every key in `rules` is present and non-null.
///
/// Absent keys are reported before null ones. The error code belongs to the
/// first offending key in rule order; the message lists all of them. A body
/// that is missing or not a JSON object has no keys.
///
/// # Errors
///
/// [`HandlerError::Validation`] describing the offending keys.
#[track_caller]
pub fn validate_payload(body: Option<&Value>, rules: &[KeyRule]) -> Result<(), HandlerError> {
    let empty = Map::new();
    let payload = body.and_then(Value::as_object).unwrap_or(&empty);

    let missing: Vec<&KeyRule> = rules
        .iter()
        .filter(|rule| !payload.contains_key(rule.key.as_str()))
        .collect();
    if let Some(first) = missing.first() {
        return Err(HandlerError::validation(
            first.missing,
            format!(
                "Missing required keys in request payload: {}",
                key_list(&missing)
            ),
        ));
    }

    let nulls: Vec<&KeyRule> = rules
        .iter()
        .filter(|rule| payload.get(rule.key.as_str()).is_some_and(Value::is_null))
        .collect();
    if let Some(first) = nulls.first() {
        return Err(HandlerError::validation(
            first.invalid_code(),
            format!(
                "Following keys in request payload have null as value: {}",
                key_list(&nulls)
            ),
        ));
    }

    Ok(())
}

fn key_list(rules: &[&KeyRule]) -> String {
    let keys: Vec<&str> = rules.iter().map(|rule| rule.key.as_str()).collect();
    format!("[{}]", keys.join(", "))
}
