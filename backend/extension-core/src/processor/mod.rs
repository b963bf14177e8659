//! Request processing pipeline.
//!
//! # Flow
//!
//! 1. Log the incoming request (failures of the logger are swallowed)
//! 2. Pull the API version out of the path, or the `Accept` header
//! 3. Resolve the handler for that version
//! 4. Acquire a bearer token if the handler needs one, retrying transient
//!    failures with exponential backoff
//! 5. Run the handler, catching panics
//! 6. Map the outcome onto a [`Response`] envelope
//!
//! [`RequestProcessor::process`] is total: every input, including a handler
//! panic, produces exactly one envelope. Dropping the returned future
//! cancels any in-flight token exchange or platform call.

mod request;
mod response;

use request::ACCEPT_HEADER;

pub use request::{Request, RequestMethod, VersionRoute, accepts_json, parse_accept_version};
pub use response::{Response, ResponseError};

use crate::auth::{Credential, Token, TokenProvider};
use crate::catalog::{ErrorCatalog, ErrorCode};
use crate::error::{AuthError, HandlerError};
use crate::resolver::{HandlerContext, UriFragments, VersionedClientResolver};

use common::HttpStatusCode;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use futures_util::FutureExt;
use log::{debug, error, info, log_enabled, warn};
use tokio::time::sleep;

pub const DEFAULT_MAX_AUTH_RETRIES: u32 = 2;
pub const DEFAULT_INITIAL_RETRY_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Bounds on token-acquisition retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_AUTH_RETRIES,
            initial_delay: DEFAULT_INITIAL_RETRY_DELAY,
            max_delay: DEFAULT_MAX_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_delay,
            initial_interval: self.initial_delay,
            max_interval: self.max_delay,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Observes every incoming request before it is dispatched.
pub trait RequestLogger: Send + Sync {
    fn log_request(&self, request: &Request);
}

/// Logs method, path and body at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct DebugRequestLogger;

impl RequestLogger for DebugRequestLogger {
    fn log_request(&self, request: &Request) {
        if !log_enabled!(log::Level::Debug) {
            return;
        }

        let body = match &request.body {
            Some(body) => serde_json::to_string(body).unwrap_or_else(|e| format!("<{e}>")),
            None => String::from("<empty>"),
        };
        debug!(
            "Incoming request {}: {} {} body={body}",
            request.id,
            request.method.as_str(),
            request.path
        );
    }
}

pub struct RequestProcessor {
    resolver: Arc<VersionedClientResolver>,
    catalog: Arc<ErrorCatalog>,
    token_provider: Arc<dyn TokenProvider>,
    credential: Credential,
    fragments: UriFragments,
    retry: RetryPolicy,
    logger: Arc<dyn RequestLogger>,
}

impl RequestProcessor {
    pub fn new(
        resolver: Arc<VersionedClientResolver>,
        catalog: Arc<ErrorCatalog>,
        token_provider: Arc<dyn TokenProvider>,
        credential: Credential,
        fragments: UriFragments,
    ) -> Self {
        Self {
            resolver,
            catalog,
            token_provider,
            credential,
            fragments,
            retry: RetryPolicy::default(),
            logger: Arc::new(DebugRequestLogger),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn catalog(&self) -> &ErrorCatalog {
        &self.catalog
    }

    pub fn fragments(&self) -> &UriFragments {
        &self.fragments
    }

    /// Parse a raw request document and process it.
    ///
    /// A document that is not a valid request yields a 400 envelope with
    /// [`ErrorCode::REQUEST_BODY_MALFORMED`].
    pub async fn process_raw(&self, raw: &[u8]) -> Response {
        match serde_json::from_slice::<Request>(raw) {
            Ok(request) => self.process(&request).await,
            Err(e) => {
                warn!("Rejecting malformed request document: {e}");
                debug!("Malformed request document: {}", String::from_utf8_lossy(raw));
                let code = ErrorCode::REQUEST_BODY_MALFORMED;
                Response::failure(
                    HttpStatusCode::BAD_REQUEST,
                    code,
                    self.catalog.detail_for(code, &e.to_string()),
                )
            }
        }
    }

    pub async fn process(&self, request: &Request) -> Response {
        // Logger panics are contained here.
        let logger = Arc::clone(&self.logger);
        if catch_unwind(AssertUnwindSafe(|| logger.log_request(request))).is_err() {
            warn!("Request logger panicked for request {}", request.id);
        }

        let response = self.dispatch(request).await;
        debug!(
            "Request {} completed with HTTP {}",
            request.id, response.status_code
        );
        response
    }

    async fn dispatch(&self, request: &Request) -> Response {
        if let Some(accept) = request.header(ACCEPT_HEADER) {
            if !accept.trim().is_empty() && !accepts_json(accept) {
                warn!("Request {} accepts no JSON media type: {accept}", request.id);
                let code = ErrorCode::REQUEST_NOT_ACCEPTABLE;
                return Response::failure(
                    HttpStatusCode::NOT_ACCEPTABLE,
                    code,
                    self.catalog.lookup(code),
                );
            }
        }

        let Some(route) = request.version_route(&self.fragments.extension_fragment) else {
            warn!("Request {} carries no API version", request.id);
            let code = ErrorCode::REQUEST_API_VERSION_MISSING;
            return Response::failure(
                HttpStatusCode::BAD_REQUEST,
                code,
                self.catalog.lookup(code),
            );
        };

        let handler = match self.resolver.resolve(&route.version) {
            Ok(handler) => handler,
            Err(e) => {
                warn!("Request {}: {e}", request.id);
                let code = ErrorCode::REQUEST_API_VERSION_UNSUPPORTED;
                let detail = format!(
                    "Invalid api version '{}' specified. Expected one of: {}",
                    route.version,
                    self.resolver.supported_versions().join(", ")
                );
                return Response::failure(HttpStatusCode::BAD_REQUEST, code, detail);
            }
        };

        let token = if handler.requires_auth() {
            match self.acquire_token().await {
                Ok(token) => Some(token),
                Err(e) => return self.auth_failure(&request.id, &e),
            }
        } else {
            None
        };
        let authenticated = token.is_some();

        let ctx = HandlerContext {
            request_id: request.id.clone(),
            version: route.version,
            fragments: self.fragments.clone(),
            resource_path: route.resource_path,
            token,
        };

        match AssertUnwindSafe(handler.handle(&ctx, request))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => Response::success(outcome.status.status_code(), outcome.items),
            Ok(Err(e)) => {
                if authenticated && e.is_token_rejection() {
                    self.token_provider.invalidate(&self.credential).await;
                }
                self.handler_failure(&request.id, &e)
            }
            Err(_) => {
                error!(
                    "Handler for API version {} panicked on request {}",
                    ctx.version, request.id
                );
                Response::failure(
                    HttpStatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DEFAULT,
                    self.catalog.lookup(ErrorCode::DEFAULT),
                )
            }
        }
    }

    async fn acquire_token(&self) -> Result<Token, AuthError> {
        let mut backoff = self.retry.backoff();
        let mut attempt = 0;

        loop {
            match self.token_provider.acquire_token(&self.credential).await {
                Ok(token) => return Ok(token),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    match backoff.next_backoff() {
                        Some(duration) => {
                            info!(
                                "Token acquisition failed ({}), retry {attempt}/{} after {duration:?}",
                                e.reason(),
                                self.retry.max_retries
                            );
                            sleep(duration).await;
                        }
                        None => return Err(e),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn auth_failure(&self, request_id: &str, e: &AuthError) -> Response {
        let (status, code) = if e.is_invalid_credentials() {
            (
                HttpStatusCode::UNAUTHORIZED,
                ErrorCode::AUTH_INVALID_CREDENTIALS,
            )
        } else {
            (
                HttpStatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::AUTH_TOKEN_ACQUISITION_FAILED,
            )
        };

        error!("Token acquisition failed for request {request_id}: {e}");
        let detail = format!("{} ({})", self.catalog.lookup(code), e.reason());
        Response::failure(status, code, detail)
    }

    fn handler_failure(&self, request_id: &str, e: &HandlerError) -> Response {
        if e.is_internal() {
            error!("Handler failed on request {request_id}: {e}");
            return Response::failure(
                HttpStatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DEFAULT,
                self.catalog.lookup(ErrorCode::DEFAULT),
            );
        }

        warn!("Handler rejected request {request_id}: {e}");

        let mut code = e.error_code();
        if !self.catalog.contains(code) {
            warn!("Error code {code} is not in the catalog, reporting the default");
            code = ErrorCode::DEFAULT;
        }

        let mut status = e.status_code();
        if status.is_success() {
            status = HttpStatusCode::INTERNAL_SERVER_ERROR;
        }

        Response::failure(status, code, self.catalog.detail_for(code, e.detail()))
    }
}
