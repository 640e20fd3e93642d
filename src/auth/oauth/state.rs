//! Anti-forgery `state` for the authorization redirect.
//!
//! Every authorization URL carries a fresh [`Nonce`] in its `state`
//! parameter. The matching [`AuthorizationState`] is held in an
//! [`AuthStateStore`](crate::store::AuthStateStore) until the callback
//! consumes it, which binds each callback to exactly one authorization
//! request for the same shop.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use std::fmt;
use std::time::Duration;

use crate::config::ShopDomain;

/// A single-use, unguessable `state` value.
///
/// 32 alphanumeric characters drawn from the operating system CSPRNG.
///
/// ```rust
/// use wholesale_sync::auth::oauth::Nonce;
///
/// let nonce = Nonce::generate();
/// assert_eq!(nonce.as_ref().len(), 32);
/// assert!(nonce.as_ref().chars().all(|c| c.is_ascii_alphanumeric()));
/// assert_ne!(nonce, Nonce::generate());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Nonce(String);

impl Nonce {
    /// Length of generated nonces.
    pub const LENGTH: usize = 32;

    /// Generates a nonce from the OS random source.
    #[must_use]
    pub fn generate() -> Self {
        let value: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(Self::LENGTH)
            .map(char::from)
            .collect();
        Self(value)
    }

    /// Wraps a nonce received on a callback.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl AsRef<str> for Nonce {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pending authorization: issued by `/authorize`, consumed by `/callback`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationState {
    /// The nonce sent as `state`.
    pub nonce: Nonce,
    /// The shop the authorization was started for.
    pub shop: ShopDomain,
    /// When the authorization URL was built.
    pub issued_at: DateTime<Utc>,
}

impl AuthorizationState {
    /// Creates a pending state for `shop` with a fresh nonce.
    #[must_use]
    pub fn issue(shop: ShopDomain) -> Self {
        Self {
            nonce: Nonce::generate(),
            shop,
            issued_at: Utc::now(),
        }
    }

    /// Returns `true` once more than `ttl` has passed since issue.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        chrono::Duration::from_std(ttl)
            .map_or(false, |ttl| now - self.issued_at > ttl)
    }
}

// Verify AuthorizationState is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthorizationState>();
};
