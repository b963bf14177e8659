use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub(crate) const ACCEPT_HEADER: &str = "accept";
const VERSION_PARAM: &str = "version";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "delete")]
    Delete,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
        }
    }

    /// Verbs whose body is forwarded.
    pub fn carries_body(&self) -> bool {
        matches!(
            self,
            RequestMethod::Post | RequestMethod::Put | RequestMethod::Delete
        )
    }
}

/// Inbound request message as the platform delivers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "generate_request_id")]
    pub id: String,
    #[serde(default)]
    pub method: RequestMethod,
    #[serde(alias = "requestUri")]
    pub path: String,
    #[serde(default, alias = "queryString")]
    pub query: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
}

fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Where a request is headed once the version has been pulled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRoute {
    pub version: String,
    /// Segments after the version, joined with `/`.
    pub resource_path: String,
}

impl Request {
    pub fn new(method: RequestMethod, path: impl Into<String>) -> Self {
        Self {
            id: generate_request_id(),
            method,
            path: path.into(),
            query: None,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Locate the API version for this request.
    ///
    /// The path has the shape `{root}/{extension_fragment}/{version}/...`.
    /// Only a segment starting with a digit counts as a version; when the
    /// segment after the extension fragment is not one, the `version=`
    /// parameter of the `Accept` header is used instead. A path without the
    /// extension fragment has no route.
    pub fn version_route(&self, extension_fragment: &str) -> Option<VersionRoute> {
        let path = self.path.split('?').next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let index = segments
            .iter()
            .position(|segment| segment.eq_ignore_ascii_case(extension_fragment))?;
        let after_extension = &segments[index + 1..];

        if let [candidate, rest @ ..] = after_extension {
            if is_version_segment(candidate) {
                return Some(VersionRoute {
                    version: candidate.to_string(),
                    resource_path: rest.join("/"),
                });
            }
        }

        let version = self.header(ACCEPT_HEADER).and_then(parse_accept_version)?;
        let resource_path = after_extension.join("/");

        Some(VersionRoute {
            version,
            resource_path,
        })
    }
}

fn is_version_segment(segment: &str) -> bool {
    segment.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Pick the first JSON-compatible media range of an `Accept` header and
/// return its `version` parameter.
///
/// `application/json;version=35.0`, `*/*;version=35.0`, `*;version=35.0`
/// and `application/*+json;version=35.0` are all JSON-compatible.
pub fn parse_accept_version(accept: &str) -> Option<String> {
    accept.split(',').find_map(|media_range| {
        let mut parts = media_range.split(';');
        let media_type = parts.next()?.trim().to_ascii_lowercase();
        if !is_json_compatible(&media_type) {
            return None;
        }

        parts.find_map(|param| {
            let (key, value) = param.split_once('=')?;
            let value = value.trim();
            (key.trim().eq_ignore_ascii_case(VERSION_PARAM) && !value.is_empty())
                .then(|| value.to_string())
        })
    })
}

/// Whether any media range of an `Accept` header is JSON-compatible.
pub fn accepts_json(accept: &str) -> bool {
    accept.split(',').any(|media_range| {
        let media_type = media_range.split(';').next().unwrap_or_default();
        is_json_compatible(&media_type.trim().to_ascii_lowercase())
    })
}

fn is_json_compatible(media_type: &str) -> bool {
    let (kind, subtype) = media_type.split_once('/').unwrap_or((media_type, "*"));
    let kind = if kind == "*" { "application" } else { kind };
    let subtype = subtype.replace("*+", "");
    let subtype = if subtype == "*" { "json" } else { subtype.as_str() };
    kind == "application" && subtype == "json"
}
