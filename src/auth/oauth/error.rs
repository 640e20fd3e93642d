//! OAuth flow errors.
//!
//! Each step of the install flow fails with its own variant, so handlers can
//! map failures to a status without inspecting messages:
//!
//! | Variant | Step | Status |
//! |---------|------|--------|
//! | [`OAuthError::InvalidShopDomain`] | initiate | 400 |
//! | [`OAuthError::MalformedRequest`] | validate | 400 |
//! | [`OAuthError::AuthenticationFailed`] | verify | 401 |
//! | [`OAuthError::ReplayOrForgedState`] | match state | 401 |
//! | [`OAuthError::ExchangeFailed`] | exchange | 500 |
//! | [`OAuthError::MetadataFetchFailed`] | enrich | 500 |
//! | [`OAuthError::Store`] | any | 500 |
//!
//! Messages never include the code, the token or the secret.
//!
//! ```rust
//! use wholesale_sync::auth::oauth::OAuthError;
//!
//! let error = OAuthError::ExchangeFailed {
//!     status: Some(400),
//!     message: "invalid code".to_string(),
//! };
//! assert_eq!(error.to_string(), "Token exchange failed (status 400): invalid code");
//! ```

use crate::clients::HttpError;
use crate::config::ShopDomain;
use crate::store::StoreError;
use thiserror::Error;

/// Errors from the OAuth install flow.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The shop parameter is not a `*.myshopify.com` domain.
    #[error("Invalid shop domain '{domain}'")]
    InvalidShopDomain {
        /// The rejected value.
        domain: String,
    },

    /// A required callback parameter is missing or empty.
    #[error("Malformed callback: {reason}")]
    MalformedRequest {
        /// What was wrong.
        reason: String,
    },

    /// The callback signature did not verify.
    #[error("HMAC signature validation failed")]
    AuthenticationFailed,

    /// The `state` is unknown, already used, expired, or was issued for a
    /// different shop.
    #[error("Unknown, expired or already used state parameter")]
    ReplayOrForgedState,

    /// Shopify refused the authorization code, or could not be reached.
    #[error("Token exchange failed (status {}): {message}", display_status(.status))]
    ExchangeFailed {
        /// Upstream status, absent for network failures.
        status: Option<u16>,
        /// Upstream error detail.
        message: String,
    },

    /// The token was stored but shop metadata could not be fetched.
    #[error("Installed {shop}, but fetching shop metadata failed: {message}")]
    MetadataFetchFailed {
        /// The shop whose credential was committed.
        shop: ShopDomain,
        /// Upstream error detail.
        message: String,
    },

    /// The credential or state store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OAuthError {
    pub(crate) fn exchange(error: &HttpError) -> Self {
        let message = match error {
            HttpError::Response(e) => e.message.clone(),
            HttpError::MaxRetries(e) => e.message.clone(),
            other => other.to_string(),
        };
        Self::ExchangeFailed {
            status: error.status(),
            message,
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};
