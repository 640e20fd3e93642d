//! Persistence seams for credentials and pending authorizations.
//!
//! Both stores are async traits so a database-backed implementation can be
//! swapped in through [`AppState`](crate::server::AppState). The in-memory
//! implementations in [`memory`] are what the binary ships with.
//!
//! Implementations must make each call atomic on its own: `take` removes and
//! returns in one step, so a nonce can never be consumed twice.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::oauth::{AuthorizationState, Nonce};
use crate::auth::ShopCredential;
use crate::config::ShopDomain;

pub use memory::{MemoryAuthStateStore, MemoryCredentialStore};

/// A store backend failed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Per-shop access credentials. At most one per shop.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the credential for `shop`, if any.
    async fn get(&self, shop: &ShopDomain) -> Result<Option<ShopCredential>, StoreError>;

    /// Stores `credential`, replacing any earlier one for the same shop.
    async fn set(&self, credential: ShopCredential) -> Result<(), StoreError>;

    /// Removes the credential for `shop`. Returns whether one existed.
    async fn delete(&self, shop: &ShopDomain) -> Result<bool, StoreError>;

    /// Lists shops that have a credential.
    async fn shops(&self) -> Result<Vec<ShopDomain>, StoreError>;
}

/// Pending authorizations keyed by nonce.
#[async_trait]
pub trait AuthStateStore: Send + Sync {
    /// Records a pending authorization.
    async fn insert(&self, state: AuthorizationState) -> Result<(), StoreError>;

    /// Removes and returns the pending authorization for `nonce`.
    ///
    /// Returns `None` if the nonce is unknown, already consumed or expired.
    async fn take(&self, nonce: &Nonce) -> Result<Option<AuthorizationState>, StoreError>;
}
