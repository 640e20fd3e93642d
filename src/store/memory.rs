//! In-memory stores backed by `tokio::sync::RwLock`.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{AuthStateStore, CredentialStore, StoreError};
use crate::auth::oauth::{AuthorizationState, Nonce};
use crate::auth::ShopCredential;
use crate::config::ShopDomain;

/// Credentials held in process memory. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<HashMap<ShopDomain, ShopCredential>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, shop: &ShopDomain) -> Result<Option<ShopCredential>, StoreError> {
        Ok(self.credentials.read().await.get(shop).cloned())
    }

    async fn set(&self, credential: ShopCredential) -> Result<(), StoreError> {
        self.credentials
            .write()
            .await
            .insert(credential.shop.clone(), credential);
        Ok(())
    }

    async fn delete(&self, shop: &ShopDomain) -> Result<bool, StoreError> {
        Ok(self.credentials.write().await.remove(shop).is_some())
    }

    async fn shops(&self) -> Result<Vec<ShopDomain>, StoreError> {
        let mut shops: Vec<ShopDomain> = self.credentials.read().await.keys().cloned().collect();
        shops.sort();
        Ok(shops)
    }
}

/// Default upper bound on pending authorizations.
pub const DEFAULT_MAX_PENDING: usize = 10_000;

/// Pending authorizations held in process memory.
///
/// Entries older than the TTL are never returned. Expired entries are pruned
/// oldest-first on insert, and once `max_pending` live entries are held the
/// oldest is evicted to make room.
#[derive(Debug)]
pub struct MemoryAuthStateStore {
    inner: RwLock<PendingStates>,
    ttl: Duration,
    max_pending: usize,
}

#[derive(Debug, Default)]
struct PendingStates {
    states: HashMap<Nonce, AuthorizationState>,
    // Insertion order; may hold nonces already taken.
    order: VecDeque<Nonce>,
}

impl PendingStates {
    fn prune_expired(&mut self, ttl: Duration, now: DateTime<Utc>) {
        while let Some(front) = self.order.front() {
            let live = self
                .states
                .get(front)
                .is_some_and(|state| !state.is_expired(ttl, now));
            if live {
                break;
            }
            if let Some(nonce) = self.order.pop_front() {
                self.states.remove(&nonce);
            }
        }
    }

    fn evict_oldest(&mut self) -> Option<AuthorizationState> {
        while let Some(nonce) = self.order.pop_front() {
            if let Some(state) = self.states.remove(&nonce) {
                return Some(state);
            }
        }
        None
    }
}

impl MemoryAuthStateStore {
    /// Creates a store whose entries expire after `ttl`, holding at most
    /// [`DEFAULT_MAX_PENDING`] entries.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(PendingStates::default()),
            ttl,
            max_pending: DEFAULT_MAX_PENDING,
        }
    }

    /// Sets the maximum number of pending entries (at least 1).
    #[must_use]
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending.max(1);
        self
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.inner.read().await.states.len()
    }

    /// Returns `true` if no entries are held.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.states.is_empty()
    }
}

#[async_trait]
impl AuthStateStore for MemoryAuthStateStore {
    async fn insert(&self, state: AuthorizationState) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.prune_expired(self.ttl, Utc::now());

        while inner.states.len() >= self.max_pending {
            let Some(evicted) = inner.evict_oldest() else { break };
            tracing::warn!(
                shop = %evicted.shop,
                max_pending = self.max_pending,
                "pending authorization limit reached, evicting oldest"
            );
        }

        inner.order.push_back(state.nonce.clone());
        inner.states.insert(state.nonce.clone(), state);
        Ok(())
    }

    async fn take(&self, nonce: &Nonce) -> Result<Option<AuthorizationState>, StoreError> {
        let taken = self.inner.write().await.states.remove(nonce);
        Ok(taken.filter(|state| !state.is_expired(self.ttl, Utc::now())))
    }
}
