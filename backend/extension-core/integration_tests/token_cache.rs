use crate::helpers::{ACCESS_TOKEN, TOKEN_PATH, credential, token_provider};

use extension_core::auth::{Credential, TokenCache, TokenProvider};

use common::RedactedSecret;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cache() -> Arc<TokenCache> {
    Arc::new(TokenCache::new(
        Arc::new(token_provider()),
        Duration::from_secs(300),
        Duration::from_secs(30),
    ))
}

async fn mount_slow_token_endpoint(server: &MockServer, expires_in: u64, expected: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": ACCESS_TOKEN, "expires_in": expires_in}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(expected)
        .mount(server)
        .await;
}

/// **VALUE**: Concurrent callers for one credential share a single exchange.
///
/// **WHY THIS MATTERS**: A burst of requests right after startup would
/// otherwise hit the identity provider once per request and trip its rate
/// limit.
///
/// **BUG THIS CATCHES**: Would catch the slot lock being released before the
/// refresh completes, letting every waiter start its own exchange.
#[tokio::test]
async fn given_concurrent_callers_when_acquiring_then_single_exchange() {
    // GIVEN: An identity provider that must be called exactly once
    let server = MockServer::start().await;
    mount_slow_token_endpoint(&server, 3600, 1).await;
    let cache = cache();
    let credential = credential(&server);

    // WHEN: Ten callers ask at the same time
    let results = join_all((0..10).map(|_| {
        let cache = Arc::clone(&cache);
        let credential = credential.clone();
        async move { cache.acquire_token(&credential).await }
    }))
    .await;

    // THEN: All got the same token, the mock verifies the single call on drop
    for result in results {
        assert_eq!(result.expect("token").access_token(), ACCESS_TOKEN);
    }
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn given_invalidated_token_when_acquiring_again_then_new_exchange() {
    let server = MockServer::start().await;
    mount_slow_token_endpoint(&server, 3600, 2).await;
    let cache = cache();
    let credential = credential(&server);

    cache.acquire_token(&credential).await.expect("first");
    cache.acquire_token(&credential).await.expect("cached");
    cache.invalidate(&credential).await;
    cache.acquire_token(&credential).await.expect("refreshed");
}

/// **VALUE**: Tokens inside the refresh skew are replaced before use.
///
/// **BUG THIS CATCHES**: Would catch a token with `expires_in` shorter than
/// the skew being reused until the platform rejects it.
#[tokio::test]
async fn given_token_expiring_within_skew_when_acquiring_again_then_refreshed() {
    // GIVEN: Tokens live 10s, skew is 30s, so every cached token is stale
    let server = MockServer::start().await;
    mount_slow_token_endpoint(&server, 10, 2).await;
    let cache = cache();
    let credential = credential(&server);

    // WHEN/THEN: Two calls, two exchanges
    cache.acquire_token(&credential).await.expect("first");
    cache.acquire_token(&credential).await.expect("second");
}

#[tokio::test]
async fn given_two_clients_when_acquiring_then_each_gets_own_slot() {
    let server = MockServer::start().await;
    mount_slow_token_endpoint(&server, 3600, 2).await;
    let cache = cache();
    let first = credential(&server);
    let second = Credential::new(server.uri(), "other-client", RedactedSecret::new("x"));

    cache.acquire_token(&first).await.expect("first client");
    cache.acquire_token(&second).await.expect("second client");
    cache.acquire_token(&first).await.expect("first client cached");

    assert_eq!(cache.len().await, 2);
}

#[tokio::test]
async fn given_failed_exchange_when_acquiring_then_nothing_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    let cache = cache();
    let credential = credential(&server);

    assert!(cache.acquire_token(&credential).await.is_err());
    assert!(cache.acquire_token(&credential).await.is_err());
}
