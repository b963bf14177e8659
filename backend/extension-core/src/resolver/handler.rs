use crate::auth::Token;
use crate::error::HandlerError;
use crate::processor::Request;

use common::HttpStatusCode;

use async_trait::async_trait;
use serde_json::Value;

/// Configured pieces of every handler's base URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriFragments {
    pub api_root: String,
    pub extension_fragment: String,
}

impl UriFragments {
    pub fn new(api_root: impl Into<String>, extension_fragment: impl Into<String>) -> Self {
        Self {
            api_root: api_root.into(),
            extension_fragment: extension_fragment.into(),
        }
    }
}

/// `{api_root}/{extension_fragment}/{version_fragment}` without doubled or
/// trailing slashes. An empty fragment contributes no segment.
pub fn build_base_uri(api_root: &str, extension_fragment: &str, version_fragment: &str) -> String {
    let mut uri = api_root.trim_end_matches('/').to_string();
    for fragment in [extension_fragment, version_fragment] {
        let fragment = fragment.trim_matches('/');
        if !fragment.is_empty() {
            uri.push('/');
            uri.push_str(fragment);
        }
    }
    uri
}

/// Everything a handler gets besides the request itself.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub request_id: String,
    pub version: String,
    pub fragments: UriFragments,
    /// Path after the version segment, without a leading slash.
    pub resource_path: String,
    /// Present when the handler requires authentication.
    pub token: Option<Token>,
}

/// Success classification reported by a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultStatus {
    #[default]
    Ok,
    Created,
    Accepted,
}

impl ResultStatus {
    pub fn status_code(&self) -> HttpStatusCode {
        match self {
            ResultStatus::Ok => HttpStatusCode::OK,
            ResultStatus::Created => HttpStatusCode::CREATED,
            ResultStatus::Accepted => HttpStatusCode::ACCEPTED,
        }
    }
}

/// Common result shape of every handler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandlerOutcome {
    pub status: ResultStatus,
    pub items: Vec<Value>,
}

impl HandlerOutcome {
    pub fn ok(items: Vec<Value>) -> Self {
        Self {
            status: ResultStatus::Ok,
            items,
        }
    }

    pub fn created(items: Vec<Value>) -> Self {
        Self {
            status: ResultStatus::Created,
            items,
        }
    }

    pub fn accepted(items: Vec<Value>) -> Self {
        Self {
            status: ResultStatus::Accepted,
            items,
        }
    }

    /// Pure acknowledgement, no items.
    pub fn acknowledged() -> Self {
        Self::default()
    }
}

/// Version-specific implementation of the extension's operations.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Whether the processor must acquire a bearer token before calling
    /// [`Handler::handle`].
    fn requires_auth(&self) -> bool {
        true
    }

    /// Base URI this handler talks to. Pure.
    fn base_uri(&self, fragments: &UriFragments, version: &str) -> String {
        build_base_uri(&fragments.api_root, &fragments.extension_fragment, version)
    }

    async fn handle(
        &self,
        ctx: &HandlerContext,
        request: &Request,
    ) -> Result<HandlerOutcome, HandlerError>;
}
