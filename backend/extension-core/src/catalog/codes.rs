use serde::{Deserialize, Serialize};

/// Stable numeric error code carried by failure responses.
///
/// Once published a code keeps its meaning forever; older clients persist the
/// number. New conditions get new numbers, retired conditions keep theirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const DEFAULT: Self = Self(-1);

    // Cluster creation
    pub const CLUSTER_CREATE_CLUSTER_NAME_MISSING: Self = Self(1001);
    pub const CLUSTER_CREATE_ORG_NAME_MISSING: Self = Self(1002);
    pub const CLUSTER_CREATE_OVDC_NAME_MISSING: Self = Self(1003);
    pub const CLUSTER_CREATE_NETWORK_NAME_MISSING: Self = Self(1004);
    pub const CLUSTER_CREATE_NUM_WORKERS_MISSING: Self = Self(1005);
    pub const CLUSTER_CREATE_CLUSTER_NAME_INVALID: Self = Self(1006);
    pub const CLUSTER_CREATE_NETWORK_NAME_INVALID: Self = Self(1007);
    pub const CLUSTER_CREATE_NUM_WORKERS_INVALID: Self = Self(1008);

    // Compute policy
    pub const OVDC_COMPUTE_POLICY_LIST_OVDC_ID_MISSING: Self = Self(2001);
    pub const OVDC_COMPUTE_POLICY_UPDATE_OVDC_ID_MISSING: Self = Self(2002);
    pub const OVDC_COMPUTE_POLICY_UPDATE_COMPUTE_POLICY_ACTION_MISSING: Self = Self(2003);
    pub const OVDC_COMPUTE_POLICY_UPDATE_COMPUTE_POLICY_NAME_MISSING: Self = Self(2004);
    pub const OVDC_INFO_OVDC_ID_MISSING: Self = Self(2005);

    // VDC lifecycle
    pub const OVDC_UPDATE_ORG_NAME_MISSING: Self = Self(3001);
    pub const OVDC_UPDATE_OVDC_NAME_MISSING: Self = Self(3002);
    pub const OVDC_UPDATE_K8S_PROVIDER_MISSING: Self = Self(3003);
    pub const OVDC_UPDATE_OVDC_ID_MISSING: Self = Self(3004);
    pub const OVDC_UPDATE_PKS_PLAN_NAME_MISSING: Self = Self(3005);
    pub const OVDC_UPDATE_PKS_CLUSTER_DOMAIN_MISSING: Self = Self(3006);

    // Request envelope and protocol
    pub const REQUEST_API_VERSION_UNSUPPORTED: Self = Self(4001);
    pub const REQUEST_API_VERSION_MISSING: Self = Self(4002);
    pub const REQUEST_BODY_MALFORMED: Self = Self(4003);
    pub const AUTH_INVALID_CREDENTIALS: Self = Self(4004);
    pub const AUTH_TOKEN_ACQUISITION_FAILED: Self = Self(4005);
    pub const PLATFORM_REQUEST_FAILED: Self = Self(4006);
    pub const REQUEST_NOT_ACCEPTABLE: Self = Self(4007);

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        ErrorCode(code)
    }
}

/// One row of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: ErrorCode,
    pub name: &'static str,
    /// Empty means "use the caller-supplied detail".
    pub message: &'static str,
}

impl CatalogEntry {
    pub const fn new(code: ErrorCode, name: &'static str, message: &'static str) -> Self {
        Self {
            code,
            name,
            message,
        }
    }
}

pub const DEFAULT_NAME: &str = "DEFAULT";
pub const DEFAULT_MESSAGE: &str =
    "This is the default error message when minor error code is not specified.";

pub const DEFAULT_ENTRY: CatalogEntry =
    CatalogEntry::new(ErrorCode::DEFAULT, DEFAULT_NAME, DEFAULT_MESSAGE);

// ============================================
// PUBLISHED TABLE
// ============================================

pub const STANDARD_ENTRIES: &[CatalogEntry] = &[
    DEFAULT_ENTRY,
    CatalogEntry::new(
        ErrorCode::CLUSTER_CREATE_CLUSTER_NAME_MISSING,
        "CLUSTER_CREATE_CLUSTER_NAME_MISSING",
        "Missing cluster name in cluster create request.",
    ),
    CatalogEntry::new(
        ErrorCode::CLUSTER_CREATE_ORG_NAME_MISSING,
        "CLUSTER_CREATE_ORG_NAME_MISSING",
        "Missing org name in cluster create request.",
    ),
    CatalogEntry::new(
        ErrorCode::CLUSTER_CREATE_OVDC_NAME_MISSING,
        "CLUSTER_CREATE_OVDC_NAME_MISSING",
        "Missing org VDC name in cluster create request.",
    ),
    CatalogEntry::new(
        ErrorCode::CLUSTER_CREATE_NETWORK_NAME_MISSING,
        "CLUSTER_CREATE_NETWORK_NAME_MISSING",
        "Missing network name in cluster create request.",
    ),
    CatalogEntry::new(
        ErrorCode::CLUSTER_CREATE_NUM_WORKERS_MISSING,
        "CLUSTER_CREATE_NUM_WORKERS_MISSING",
        "Missing worker count in cluster create request.",
    ),
    CatalogEntry::new(
        ErrorCode::CLUSTER_CREATE_CLUSTER_NAME_INVALID,
        "CLUSTER_CREATE_CLUSTER_NAME_INVALID",
        "Invalid cluster name in cluster create request.",
    ),
    CatalogEntry::new(
        ErrorCode::CLUSTER_CREATE_NETWORK_NAME_INVALID,
        "CLUSTER_CREATE_NETWORK_NAME_INVALID",
        "Invalid network name in cluster create request.",
    ),
    CatalogEntry::new(
        ErrorCode::CLUSTER_CREATE_NUM_WORKERS_INVALID,
        "CLUSTER_CREATE_NUM_WORKERS_INVALID",
        "Invalid worker count in cluster create request.",
    ),
    CatalogEntry::new(
        ErrorCode::OVDC_COMPUTE_POLICY_LIST_OVDC_ID_MISSING,
        "OVDC_COMPUTE_POLICY_LIST_OVDC_ID_MISSING",
        "Missing org VDC id in compute policy list request.",
    ),
    CatalogEntry::new(
        ErrorCode::OVDC_COMPUTE_POLICY_UPDATE_OVDC_ID_MISSING,
        "OVDC_COMPUTE_POLICY_UPDATE_OVDC_ID_MISSING",
        "Missing org VDC id in compute policy update request.",
    ),
    CatalogEntry::new(
        ErrorCode::OVDC_COMPUTE_POLICY_UPDATE_COMPUTE_POLICY_ACTION_MISSING,
        "OVDC_COMPUTE_POLICY_UPDATE_COMPUTE_POLICY_ACTION_MISSING",
        "Missing compute policy action in compute policy update request.",
    ),
    CatalogEntry::new(
        ErrorCode::OVDC_COMPUTE_POLICY_UPDATE_COMPUTE_POLICY_NAME_MISSING,
        "OVDC_COMPUTE_POLICY_UPDATE_COMPUTE_POLICY_NAME_MISSING",
        "Missing compute policy name in compute policy update request.",
    ),
    CatalogEntry::new(
        ErrorCode::OVDC_INFO_OVDC_ID_MISSING,
        "OVDC_INFO_OVDC_ID_MISSING",
        "Missing org VDC id in org VDC info request.",
    ),
    CatalogEntry::new(
        ErrorCode::OVDC_UPDATE_ORG_NAME_MISSING,
        "OVDC_UPDATE_ORG_NAME_MISSING",
        "",
    ),
    CatalogEntry::new(
        ErrorCode::OVDC_UPDATE_OVDC_NAME_MISSING,
        "OVDC_UPDATE_OVDC_NAME_MISSING",
        "",
    ),
    CatalogEntry::new(
        ErrorCode::OVDC_UPDATE_K8S_PROVIDER_MISSING,
        "OVDC_UPDATE_K8S_PROVIDER_MISSING",
        "",
    ),
    CatalogEntry::new(
        ErrorCode::OVDC_UPDATE_OVDC_ID_MISSING,
        "OVDC_UPDATE_OVDC_ID_MISSING",
        "",
    ),
    CatalogEntry::new(
        ErrorCode::OVDC_UPDATE_PKS_PLAN_NAME_MISSING,
        "OVDC_UPDATE_PKS_PLAN_NAME_MISSING",
        "",
    ),
    CatalogEntry::new(
        ErrorCode::OVDC_UPDATE_PKS_CLUSTER_DOMAIN_MISSING,
        "OVDC_UPDATE_PKS_CLUSTER_DOMAIN_MISSING",
        "",
    ),
    CatalogEntry::new(
        ErrorCode::REQUEST_API_VERSION_UNSUPPORTED,
        "REQUEST_API_VERSION_UNSUPPORTED",
        "Requested API version is not supported.",
    ),
    CatalogEntry::new(
        ErrorCode::REQUEST_API_VERSION_MISSING,
        "REQUEST_API_VERSION_MISSING",
        "Request does not specify an API version.",
    ),
    CatalogEntry::new(
        ErrorCode::REQUEST_BODY_MALFORMED,
        "REQUEST_BODY_MALFORMED",
        "Request body could not be parsed.",
    ),
    CatalogEntry::new(
        ErrorCode::AUTH_INVALID_CREDENTIALS,
        "AUTH_INVALID_CREDENTIALS",
        "Identity provider rejected the client credentials.",
    ),
    CatalogEntry::new(
        ErrorCode::AUTH_TOKEN_ACQUISITION_FAILED,
        "AUTH_TOKEN_ACQUISITION_FAILED",
        "Unable to acquire an access token from the identity provider.",
    ),
    CatalogEntry::new(
        ErrorCode::PLATFORM_REQUEST_FAILED,
        "PLATFORM_REQUEST_FAILED",
        "The platform rejected the forwarded request.",
    ),
    CatalogEntry::new(
        ErrorCode::REQUEST_NOT_ACCEPTABLE,
        "REQUEST_NOT_ACCEPTABLE",
        "Responses can only be served as JSON.",
    ),
];
