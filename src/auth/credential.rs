//! Per-shop credentials produced by the install flow.

use crate::auth::AuthScopes;
use crate::config::ShopDomain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque Shopify access token.
///
/// The token authorizes calls against one merchant's store, so it is never
/// printed: `Debug` and `Display` both render `AccessToken(*****)`. Use
/// [`AccessToken::expose`] at the single point where the token is placed in
/// a request header.
///
/// # Example
///
/// ```rust
/// use wholesale_sync::AccessToken;
///
/// let token = AccessToken::new("shpat_abc123");
/// assert_eq!(format!("{token:?}"), "AccessToken(*****)");
/// assert_eq!(token.expose(), "shpat_abc123");
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for use in an `X-Shopify-Access-Token` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the token is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(*****)")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(*****)")
    }
}

/// Shop metadata from `GET /admin/api/{version}/shop.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopInfo {
    /// The shop's display name.
    #[serde(default)]
    pub name: Option<String>,
    /// The shop owner's contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// The shop's primary (possibly custom) domain.
    #[serde(default)]
    pub domain: Option<String>,
}

/// The live credential for one shop.
///
/// At most one credential exists per [`ShopDomain`]; a later install
/// replaces the earlier one.
#[derive(Clone, Debug)]
pub struct ShopCredential {
    /// The shop this credential is for.
    pub shop: ShopDomain,
    /// The token for Admin API calls.
    pub access_token: AccessToken,
    /// The scopes Shopify reported as granted.
    pub scopes: AuthScopes,
    /// When the token was obtained.
    pub issued_at: DateTime<Utc>,
    /// Shop metadata, absent when the metadata fetch failed.
    pub shop_info: Option<ShopInfo>,
}

impl ShopCredential {
    /// Creates a credential issued now, without shop metadata.
    #[must_use]
    pub fn new(shop: ShopDomain, access_token: AccessToken, scopes: AuthScopes) -> Self {
        Self {
            shop,
            access_token,
            scopes,
            issued_at: Utc::now(),
            shop_info: None,
        }
    }

    /// Attaches shop metadata.
    #[must_use]
    pub fn with_shop_info(mut self, info: ShopInfo) -> Self {
        self.shop_info = Some(info);
        self
    }
}

// Verify ShopCredential is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopCredential>();
};
