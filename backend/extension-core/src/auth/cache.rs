//! Expiry-aware token cache with single-flight refresh.
//!
//! # Architecture
//!
//! - One slot per credential identity, each slot behind its own async mutex
//! - The slot map itself sits behind an `RwLock`; the write lock is only
//!   taken the first time a credential is seen
//! - A caller that finds a stale token refreshes while holding the slot
//!   lock, so concurrent callers for the same credential wait for that one
//!   exchange instead of starting their own
//! - Different credentials never contend on the same slot

use super::{Credential, CredentialIdentity, Token, TokenProvider};
use crate::error::AuthError;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::{Mutex, RwLock};

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_REFRESH_SKEW: Duration = Duration::from_secs(30);

type Slot = Arc<Mutex<Option<Token>>>;

pub struct TokenCache {
    inner: Arc<dyn TokenProvider>,
    slots: RwLock<HashMap<CredentialIdentity, Slot>>,
    default_ttl: Duration,
    refresh_skew: Duration,
}

impl TokenCache {
    /// # Arguments
    ///
    /// * `inner` - Provider that performs the actual exchange
    /// * `default_ttl` - Lifetime assumed when the provider omits `expires_in`
    /// * `refresh_skew` - Refresh this long before the token expires
    pub fn new(
        inner: Arc<dyn TokenProvider>,
        default_ttl: Duration,
        refresh_skew: Duration,
    ) -> Self {
        Self {
            inner,
            slots: RwLock::new(HashMap::new()),
            default_ttl,
            refresh_skew,
        }
    }

    async fn slot(&self, identity: &CredentialIdentity) -> Slot {
        if let Some(slot) = self.slots.read().await.get(identity) {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(identity.clone()).or_default())
    }

    /// Number of credentials seen so far.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

#[async_trait]
impl TokenProvider for TokenCache {
    async fn acquire_token(&self, credential: &Credential) -> Result<Token, AuthError> {
        let identity = credential.identity();
        let slot = self.slot(&identity).await;
        let mut cached = slot.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(self.default_ttl, self.refresh_skew) {
                debug!("Reusing cached token for {identity}");
                return Ok(token.clone());
            }
            debug!("Cached token for {identity} is stale, refreshing");
        }

        let token = self.inner.acquire_token(credential).await?;
        info!("Cached new token for {identity}");
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn invalidate(&self, credential: &Credential) {
        let identity = credential.identity();
        let slot = self.slots.read().await.get(&identity).cloned();

        if let Some(slot) = slot {
            *slot.lock().await = None;
            info!("Invalidated cached token for {identity}");
        }
    }
}
