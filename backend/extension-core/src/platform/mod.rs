//! Forwarding handler for the wrapped cloud platform.
//!
//! One [`PlatformHandler`] can serve several API versions: the version comes
//! from the [`HandlerContext`] and ends up in both the base URI and the
//! versioned `Accept` header.

use crate::VERSIONED_JSON_MEDIA_TYPE_PREFIX;
use crate::error::{HandlerError, PlatformError};
use crate::processor::{Request, RequestMethod};
use crate::resolver::{Handler, HandlerContext, HandlerOutcome};
use crate::validation::{KeyRule, ValidationRoute};

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use url::Url;

pub const DEFAULT_PLATFORM_TIMEOUT: Duration = Duration::from_secs(30);
const PLATFORM_MESSAGE_FIELD: &str = "message";

#[derive(Debug, Clone)]
pub struct PlatformHandler {
    client: Client,
    validation: Vec<ValidationRoute>,
}

impl PlatformHandler {
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] if the proxy URL is rejected or the
    /// client cannot be built.
    pub fn new(timeout: Duration, proxy_url: Option<&str>) -> Result<Self, PlatformError> {
        let mut builder = Client::builder().timeout(timeout);
        if let Some(proxy_url) = proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self::with_client(builder.build()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            validation: Vec::new(),
        }
    }

    /// Require `rules` to hold for `method` requests whose resource path
    /// matches `pattern` (see [`ValidationRoute`]).
    pub fn with_validation(
        self,
        method: RequestMethod,
        pattern: &'static str,
        rules: &'static [KeyRule],
    ) -> Self {
        self.with_validation_routes([ValidationRoute::new(method, pattern, rules)])
    }

    /// Add routes in order. The first route matching a request applies.
    pub fn with_validation_routes(
        mut self,
        routes: impl IntoIterator<Item = ValidationRoute>,
    ) -> Self {
        self.validation.extend(routes);
        self
    }

    fn validate(&self, ctx: &HandlerContext, request: &Request) -> Result<(), HandlerError> {
        let matched = self.validation.iter().find_map(|route| {
            route
                .capture(request.method, &ctx.resource_path)
                .map(|captured| (route, captured))
        });

        match matched {
            Some((route, captured)) => {
                debug!(
                    "Validating request {} against {} {}",
                    ctx.request_id,
                    route.method.as_str(),
                    route.pattern
                );
                route.validate(captured, request.body.as_ref())
            }
            None => Ok(()),
        }
    }

    /// `{base_uri}/{resource_path}` plus the inbound query string.
    pub fn target_url(
        &self,
        ctx: &HandlerContext,
        query: Option<&str>,
    ) -> Result<Url, HandlerError> {
        let base = self.base_uri(&ctx.fragments, &ctx.version);
        let resource = ctx.resource_path.trim_matches('/');
        let target = if resource.is_empty() {
            base
        } else {
            format!("{base}/{resource}")
        };

        let mut url = Url::parse(&target)?;
        if let Some(query) = query.map(|q| q.trim_start_matches('?')).filter(|q| !q.is_empty()) {
            url.set_query(Some(query));
        }
        Ok(url)
    }
}

fn reqwest_method(method: RequestMethod) -> Method {
    match method {
        RequestMethod::Get => Method::GET,
        RequestMethod::Post => Method::POST,
        RequestMethod::Put => Method::PUT,
        RequestMethod::Delete => Method::DELETE,
    }
}

/// Array bodies become items, any other non-null value a single item.
fn body_items(bytes: &[u8]) -> Result<Vec<Value>, HandlerError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    Ok(match serde_json::from_slice::<Value>(bytes)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        value => vec![value],
    })
}

/// Prefer the platform's own `message` field over the raw body.
fn failure_message(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .get(PLATFORM_MESSAGE_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    match message {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("platform request failed")
            .to_string(),
    }
}

#[async_trait]
impl Handler for PlatformHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        request: &Request,
    ) -> Result<HandlerOutcome, HandlerError> {
        self.validate(ctx, request)?;

        let Some(token) = ctx.token.as_ref() else {
            return Err(HandlerError::internal("platform call attempted without a bearer token"));
        };

        let url = self.target_url(ctx, request.query.as_deref())?;
        debug!(
            "Forwarding request {} as {} {url}",
            ctx.request_id,
            request.method.as_str()
        );

        let mut outbound = self
            .client
            .request(reqwest_method(request.method), url)
            .header(AUTHORIZATION, token.bearer_header())
            .header(
                ACCEPT,
                format!("{VERSIONED_JSON_MEDIA_TYPE_PREFIX}{}", ctx.version),
            );
        if let Some(body) = request.body.as_ref().filter(|_| request.method.carries_body()) {
            outbound = outbound.json(body);
        }

        let response = outbound
            .send()
            .await
            .map_err(|e| HandlerError::transport(format!("platform unreachable: {e}")))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            HandlerError::transport(format!("failed to read platform response: {e}"))
        })?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            warn!(
                "Platform answered request {} with HTTP {}",
                ctx.request_id,
                status.as_u16()
            );
            return Err(HandlerError::platform(
                status.as_u16(),
                failure_message(status, &body),
            ));
        }

        let items = body_items(&bytes)?;
        Ok(match status {
            StatusCode::CREATED => HandlerOutcome::created(items),
            StatusCode::ACCEPTED => HandlerOutcome::accepted(items),
            _ => HandlerOutcome::ok(items),
        })
    }
}
