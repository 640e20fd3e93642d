//! Authorization URL generation.
//!
//! [`begin_auth`] is the first step of the install flow: it validates the
//! shop, records a fresh [`AuthorizationState`] and returns the Shopify URL
//! to redirect the merchant to. It makes no network call.

use tracing::info;

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::state::{AuthorizationState, Nonce};
use crate::config::{AppConfig, ShopDomain};
use crate::store::AuthStateStore;

/// Result of initiating authorization.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The full authorization URL to redirect the merchant to.
    pub auth_url: String,
    /// The nonce sent as `state`, already recorded in the state store.
    pub state: Nonce,
}

/// Builds the authorization URL for `shop`.
///
/// The URL is
/// `https://{shop}/admin/oauth/authorize?client_id&scope&redirect_uri&state`,
/// plus `grant_options[]=per-user` when online tokens are configured.
///
/// # Errors
///
/// - [`OAuthError::InvalidShopDomain`] if `shop` is not a
///   `*.myshopify.com` domain
/// - [`OAuthError::Store`] if the pending state cannot be recorded
///
/// # Example
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::time::Duration;
/// use wholesale_sync::{AppConfig, ApiKey, ApiSecretKey, HostUrl};
/// use wholesale_sync::auth::oauth::begin_auth;
/// use wholesale_sync::store::MemoryAuthStateStore;
///
/// let config = AppConfig::builder()
///     .api_key(ApiKey::new("api-key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .app_url(HostUrl::new("https://app.example.com").unwrap())
///     .build()
///     .unwrap();
/// let states = MemoryAuthStateStore::new(Duration::from_secs(600));
///
/// let result = begin_auth(&config, &states, "demo.myshopify.com").await.unwrap();
/// assert!(result.auth_url.starts_with("https://demo.myshopify.com/admin/oauth/authorize?"));
/// # }
/// ```
pub async fn begin_auth(
    config: &AppConfig,
    states: &dyn AuthStateStore,
    shop: &str,
) -> Result<BeginAuthResult, OAuthError> {
    let shop = ShopDomain::new(shop).map_err(|_| OAuthError::InvalidShopDomain {
        domain: shop.to_string(),
    })?;

    let pending = AuthorizationState::issue(shop.clone());
    let nonce = pending.nonce.clone();
    let auth_url = authorization_url(config, &shop, &nonce);

    states.insert(pending).await?;

    info!(shop = %shop, "authorization started");

    Ok(BeginAuthResult {
        auth_url,
        state: nonce,
    })
}

/// Renders the authorization URL without recording any state.
#[must_use]
pub fn authorization_url(config: &AppConfig, shop: &ShopDomain, nonce: &Nonce) -> String {
    let scope = config.scopes().to_string();
    let redirect_uri = config.redirect_uri();

    let mut url = format!(
        "https://{}/admin/oauth/authorize?client_id={}&scope={}&redirect_uri={}&state={}",
        shop.as_ref(),
        urlencoding::encode(config.api_key().as_ref()),
        urlencoding::encode(&scope),
        urlencoding::encode(&redirect_uri),
        urlencoding::encode(nonce.as_ref()),
    );

    if config.online_tokens() {
        url.push_str("&grant_options[]=per-user");
    }

    url
}
