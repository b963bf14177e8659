use crate::auth::{Credential, Token, TokenProvider};
use crate::catalog::{DEFAULT_ENTRY, ErrorCatalog, ErrorCode};
use crate::error::{AuthError, HandlerError};
use crate::processor::{Request, RequestLogger, RequestMethod, RequestProcessor, RetryPolicy};
use crate::resolver::{
    Handler, HandlerContext, HandlerOutcome, UriFragments, VersionedClientResolver,
};

use common::{HttpStatusCode, RedactedSecret};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

// ============================================
// STUBS
// ============================================

type AuthOutcome = fn(usize) -> Result<Token, AuthError>;

/// Provider whose answer depends on the attempt number (0-based).
struct StubTokenProvider {
    outcome: AuthOutcome,
    calls: AtomicUsize,
    invalidations: AtomicUsize,
}

impl StubTokenProvider {
    fn new(outcome: AuthOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for StubTokenProvider {
    async fn acquire_token(&self, _credential: &Credential) -> Result<Token, AuthError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.outcome)(attempt)
    }

    async fn invalidate(&self, _credential: &Credential) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

fn always_ok(_: usize) -> Result<Token, AuthError> {
    Ok(Token::new("stub-token", Some(Duration::from_secs(3600))))
}

/// Echoes what the processor handed over.
struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        _request: &Request,
    ) -> Result<HandlerOutcome, HandlerError> {
        Ok(HandlerOutcome::ok(vec![json!({
            "version": ctx.version,
            "resource": ctx.resource_path,
            "authenticated": ctx.token.is_some(),
        })]))
    }
}

struct PublicHandler;

#[async_trait]
impl Handler for PublicHandler {
    fn requires_auth(&self) -> bool {
        false
    }

    async fn handle(
        &self,
        ctx: &HandlerContext,
        _request: &Request,
    ) -> Result<HandlerOutcome, HandlerError> {
        Ok(HandlerOutcome::created(vec![json!(ctx.token.is_some())]))
    }
}

struct FailingHandler(fn() -> HandlerError);

#[async_trait]
impl Handler for FailingHandler {
    async fn handle(
        &self,
        _ctx: &HandlerContext,
        _request: &Request,
    ) -> Result<HandlerOutcome, HandlerError> {
        Err((self.0)())
    }
}

struct PanickingHandler;

#[async_trait]
impl Handler for PanickingHandler {
    async fn handle(
        &self,
        _ctx: &HandlerContext,
        _request: &Request,
    ) -> Result<HandlerOutcome, HandlerError> {
        panic!("handler blew up");
    }
}

struct PanickingLogger;

impl RequestLogger for PanickingLogger {
    fn log_request(&self, _request: &Request) {
        panic!("logger blew up");
    }
}

// ============================================
// HELPERS
// ============================================

const FAST_RETRY: RetryPolicy = RetryPolicy {
    max_retries: 2,
    initial_delay: Duration::from_millis(1),
    max_delay: Duration::from_millis(2),
};

fn processor_with(
    handler: Arc<dyn Handler>,
    provider: Arc<StubTokenProvider>,
) -> RequestProcessor {
    let resolver = VersionedClientResolver::builder()
        .register("35.0", handler)
        .and_then(|builder| builder.register("36.0", Arc::new(EchoHandler)))
        .unwrap()
        .build();

    RequestProcessor::new(
        Arc::new(resolver),
        Arc::new(ErrorCatalog::standard().unwrap()),
        provider,
        Credential::new(
            "https://idp.example.com",
            "client",
            RedactedSecret::new("secret"),
        ),
        UriFragments::new("https://vcd.example.com/api", "cse"),
    )
    .with_retry_policy(FAST_RETRY)
}

fn get(path: &str) -> Request {
    Request::new(RequestMethod::Get, path)
}

// ============================================
// TESTS
// ============================================

/// **VALUE**: The happy path produces 200 with the handler's items and the
/// route pieces the handler needs.
///
/// **BUG THIS CATCHES**: Would catch the version segment leaking into the
/// resource path handed to the handler.
#[tokio::test]
async fn given_supported_version_when_processing_then_handler_items_returned() {
    // GIVEN
    let provider = StubTokenProvider::new(always_ok);
    let processor = processor_with(Arc::new(EchoHandler), provider.clone());

    // WHEN
    let response = processor.process(&get("/api/cse/35.0/clusters")).await;

    // THEN
    assert_eq!(response.status_code, HttpStatusCode::OK);
    assert_eq!(
        response.body,
        vec![json!({"version": "35.0", "resource": "clusters", "authenticated": true})]
    );
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn given_unsupported_version_when_processing_then_400_with_supported_list() {
    let provider = StubTokenProvider::new(always_ok);
    let processor = processor_with(Arc::new(EchoHandler), provider.clone());

    let response = processor.process(&get("/api/cse/9.9/clusters")).await;

    assert_eq!(response.status_code, HttpStatusCode::BAD_REQUEST);
    assert_eq!(
        response.error_code(),
        Some(ErrorCode::REQUEST_API_VERSION_UNSUPPORTED)
    );
    let detail = response.detail().unwrap();
    assert!(detail.contains("9.9"));
    assert!(detail.contains("35.0, 36.0"));
    assert_eq!(provider.calls(), 0, "no token for a request that cannot route");
}

#[tokio::test]
async fn given_no_version_when_processing_then_400_version_missing() {
    let processor = processor_with(Arc::new(EchoHandler), StubTokenProvider::new(always_ok));

    let response = processor.process(&get("/api/cse/clusters")).await;

    assert_eq!(response.status_code, HttpStatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some(ErrorCode::REQUEST_API_VERSION_MISSING));
    assert!(!response.detail().unwrap().is_empty());
}

/// **VALUE**: A client that accepts no JSON gets 406 before any routing.
///
/// **BUG THIS CATCHES**: Would catch a `text/html` client being sent a JSON
/// envelope for a request the handler ran anyway, or being told its version
/// is missing.
#[tokio::test]
async fn given_accept_without_json_when_processing_then_406_not_acceptable() {
    // GIVEN
    let provider = StubTokenProvider::new(always_ok);
    let processor = processor_with(Arc::new(EchoHandler), provider.clone());
    let request = get("/api/cse/35.0/clusters").with_header("Accept", "text/html;version=35.0");

    // WHEN
    let response = processor.process(&request).await;

    // THEN
    assert_eq!(response.status_code, HttpStatusCode::NOT_ACCEPTABLE);
    assert_eq!(response.error_code(), Some(ErrorCode::REQUEST_NOT_ACCEPTABLE));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn given_wildcard_accept_when_processing_then_served() {
    let processor = processor_with(Arc::new(EchoHandler), StubTokenProvider::new(always_ok));
    let request = get("/api/cse/35.0/clusters").with_header("Accept", "text/html, */*");

    let response = processor.process(&request).await;

    assert_eq!(response.status_code, HttpStatusCode::OK);
}

/// **VALUE**: Rejected credentials map to 401 without retrying.
///
/// **BUG THIS CATCHES**: Would catch retrying a 401 (locking out the client at
/// the identity provider) or reporting it as a 500.
#[tokio::test]
async fn given_invalid_credentials_when_processing_then_401_without_retry() {
    // GIVEN
    let provider = StubTokenProvider::new(|_| Err(AuthError::from_http_response(401, "")));
    let processor = processor_with(Arc::new(EchoHandler), provider.clone());

    // WHEN
    let response = processor.process(&get("/api/cse/35.0/clusters")).await;

    // THEN
    assert_eq!(response.status_code, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some(ErrorCode::AUTH_INVALID_CREDENTIALS));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn given_transient_auth_failures_when_processing_then_retried_until_success() {
    // GIVEN: Two timeouts, then a token
    let provider = StubTokenProvider::new(|attempt| {
        if attempt < 2 {
            Err(AuthError::timeout(1))
        } else {
            always_ok(attempt)
        }
    });
    let processor = processor_with(Arc::new(EchoHandler), provider.clone());

    // WHEN
    let response = processor.process(&get("/api/cse/35.0/clusters")).await;

    // THEN
    assert_eq!(response.status_code, HttpStatusCode::OK);
    assert_eq!(provider.calls(), 3);
}

/// **VALUE**: Retries are bounded by the policy.
///
/// **BUG THIS CATCHES**: Would catch an unbounded retry loop hanging the
/// request while the identity provider is down.
#[tokio::test]
async fn given_persistent_transport_failure_when_processing_then_500_after_retries() {
    // GIVEN
    let provider = StubTokenProvider::new(|_| Err(AuthError::transport("connection refused")));
    let processor = processor_with(Arc::new(EchoHandler), provider.clone());

    // WHEN
    let response = processor.process(&get("/api/cse/35.0/clusters")).await;

    // THEN
    assert_eq!(response.status_code, HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.error_code(),
        Some(ErrorCode::AUTH_TOKEN_ACQUISITION_FAILED)
    );
    assert_eq!(provider.calls(), 1 + FAST_RETRY.max_retries as usize);
}

#[tokio::test]
async fn given_malformed_token_response_when_processing_then_500_without_retry() {
    let provider = StubTokenProvider::new(|_| Err(AuthError::malformed("no access_token")));
    let processor = processor_with(Arc::new(EchoHandler), provider.clone());

    let response = processor.process(&get("/api/cse/35.0/clusters")).await;

    assert_eq!(response.status_code, HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(provider.calls(), 1);
}

/// **VALUE**: A panicking handler still yields an envelope.
///
/// **BUG THIS CATCHES**: Would catch a panic unwinding through `process` and
/// leaving the platform without a reply.
#[tokio::test]
async fn given_panicking_handler_when_processing_then_500_default() {
    // GIVEN
    let processor = processor_with(Arc::new(PanickingHandler), StubTokenProvider::new(always_ok));

    // WHEN
    let response = processor.process(&get("/api/cse/35.0/clusters")).await;

    // THEN
    assert_eq!(response.status_code, HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error_code(), Some(ErrorCode::DEFAULT));
    assert_eq!(response.detail(), Some(DEFAULT_ENTRY.message));
}

#[tokio::test]
async fn given_internal_handler_error_when_processing_then_detail_not_leaked() {
    let handler = FailingHandler(|| HandlerError::internal("secret internal path /etc/x"));
    let processor = processor_with(Arc::new(handler), StubTokenProvider::new(always_ok));

    let response = processor.process(&get("/api/cse/35.0/clusters")).await;

    assert_eq!(response.status_code, HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error_code(), Some(ErrorCode::DEFAULT));
    assert_eq!(response.detail(), Some(DEFAULT_ENTRY.message));
}

#[tokio::test]
async fn given_validation_error_without_detail_when_processing_then_catalog_message() {
    let handler = FailingHandler(|| {
        HandlerError::validation(ErrorCode::CLUSTER_CREATE_CLUSTER_NAME_MISSING, "")
    });
    let processor = processor_with(Arc::new(handler), StubTokenProvider::new(always_ok));

    let response = processor.process(&get("/api/cse/35.0/clusters")).await;

    assert_eq!(response.status_code, HttpStatusCode::BAD_REQUEST);
    assert_eq!(
        response.error_code(),
        Some(ErrorCode::CLUSTER_CREATE_CLUSTER_NAME_MISSING)
    );
    assert_eq!(
        response.detail(),
        Some("Missing cluster name in cluster create request.")
    );
}

#[tokio::test]
async fn given_unregistered_handler_code_when_processing_then_default_code() {
    let handler = FailingHandler(|| {
        HandlerError::rejected(HttpStatusCode::FORBIDDEN, Some(ErrorCode(77_777)), "nope")
    });
    let processor = processor_with(Arc::new(handler), StubTokenProvider::new(always_ok));

    let response = processor.process(&get("/api/cse/35.0/clusters")).await;

    assert_eq!(response.status_code, HttpStatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some(ErrorCode::DEFAULT));
    assert_eq!(response.detail(), Some("nope"));
}

/// **VALUE**: A platform 401 evicts the token the handler used.
///
/// **BUG THIS CATCHES**: Would catch a revoked token staying cached until it
/// expires, failing every request in the meantime.
#[tokio::test]
async fn given_platform_rejects_token_when_processing_then_token_invalidated() {
    // GIVEN
    let provider = StubTokenProvider::new(always_ok);
    let handler = FailingHandler(|| HandlerError::platform(401, "token revoked"));
    let processor = processor_with(Arc::new(handler), provider.clone());

    // WHEN
    let response = processor.process(&get("/api/cse/35.0/clusters")).await;

    // THEN
    assert_eq!(response.status_code, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some(ErrorCode::PLATFORM_REQUEST_FAILED));
    assert_eq!(provider.invalidations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn given_handler_without_auth_when_processing_then_no_token_requested() {
    let provider = StubTokenProvider::new(|_| Err(AuthError::from_http_response(401, "")));
    let processor = processor_with(Arc::new(PublicHandler), provider.clone());

    let response = processor.process(&get("/api/cse/35.0/about")).await;

    assert_eq!(response.status_code, HttpStatusCode::CREATED);
    assert_eq!(response.body, vec![json!(false)]);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn given_panicking_logger_when_processing_then_request_unaffected() {
    let processor = processor_with(Arc::new(EchoHandler), StubTokenProvider::new(always_ok))
        .with_logger(Arc::new(PanickingLogger));

    let response = processor.process(&get("/api/cse/35.0/clusters")).await;

    assert_eq!(response.status_code, HttpStatusCode::OK);
}

/// **VALUE**: Unparsable request documents become 400 envelopes.
///
/// **BUG THIS CATCHES**: Would catch an empty or truncated message from the
/// platform crashing the process instead of being answered.
#[tokio::test]
async fn given_malformed_documents_when_processing_raw_then_400_body_malformed() {
    // GIVEN
    let processor = processor_with(Arc::new(EchoHandler), StubTokenProvider::new(always_ok));

    let documents: [&[u8]; 4] = [b"", b"{", b"[]", br#"{"method":"GET"}"#];
    for raw in documents {
        // WHEN
        let response = processor.process_raw(raw).await;

        // THEN
        assert_eq!(response.status_code, HttpStatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), Some(ErrorCode::REQUEST_BODY_MALFORMED));
    }
}

#[tokio::test]
async fn given_valid_document_when_processing_raw_then_dispatched() {
    let processor = processor_with(Arc::new(EchoHandler), StubTokenProvider::new(always_ok));
    let raw = br#"{"id":"r1","method":"GET","path":"/api/cse/36.0/ovdcs"}"#;

    let response = processor.process_raw(raw).await;

    assert_eq!(response.status_code, HttpStatusCode::OK);
    assert_eq!(response.body[0]["version"], "36.0");
    assert_eq!(response.body[0]["resource"], "ovdcs");
}
