//! OAuth callback validation and token exchange.
//!
//! After the merchant approves the install, Shopify redirects to the app's
//! callback with `shop`, `code`, `state`, `timestamp`, `host` and `hmac`.
//! [`validate_auth_callback`] runs the steps strictly in order and stops at
//! the first failure:
//!
//! 1. **Validate**: `shop`, `code` and `hmac` present; `shop` well formed
//! 2. **Verify**: the `hmac` matches the other params
//! 3. **Match state**: `state` names a pending, unexpired authorization for
//!    this shop; it is consumed whether or not the shop matches
//! 4. **Exchange**: the code is traded for an access token (never retried)
//! 5. **Enrich**: shop metadata is fetched (retried on transient failures)
//! 6. **Commit**: the credential replaces any earlier one for the shop
//!
//! Steps 1 to 3 make no network call. The commit happens even when step 5
//! failed; that failure is then returned as
//! [`OAuthError::MetadataFetchFailed`] with the token already stored.

use tracing::{error, info, warn};

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::hmac::{SignatureVerifier, Verdict};
use crate::auth::oauth::state::Nonce;
use crate::auth::{AuthScopes, ShopCredential, ShopInfo};
use crate::clients::AdminClient;
use crate::config::{AppConfig, ShopDomain};
use crate::store::{AuthStateStore, CredentialStore};

/// Raw callback query parameters, in the order received.
///
/// All parameters are kept, including ones this service does not use, so the
/// signature is checked over exactly what Shopify signed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthQuery {
    params: Vec<(String, String)>,
}

impl AuthQuery {
    /// Wraps decoded query pairs.
    #[must_use]
    pub const fn new(params: Vec<(String, String)>) -> Self {
        Self { params }
    }

    /// Returns the first value for `key`, trimmed, if non-empty.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Returns all params.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

impl From<Vec<(String, String)>> for AuthQuery {
    fn from(params: Vec<(String, String)>) -> Self {
        Self::new(params)
    }
}

/// Stores and clients the callback needs.
#[derive(Clone, Copy)]
pub struct CallbackDeps<'a> {
    /// Service configuration.
    pub config: &'a AppConfig,
    /// Shared outbound HTTP client.
    pub http: &'a reqwest::Client,
    /// Pending authorizations.
    pub states: &'a dyn AuthStateStore,
    /// Committed credentials.
    pub credentials: &'a dyn CredentialStore,
}

/// A completed install.
#[derive(Clone, Debug)]
pub struct Installed {
    /// The shop that was installed.
    pub shop: ShopDomain,
    /// Scopes Shopify reported as granted.
    pub scopes: AuthScopes,
    /// Shop metadata.
    pub shop_info: ShopInfo,
    /// Where to send the merchant next.
    pub landing_url: String,
}

/// Validates a callback, exchanges its code and commits the credential.
///
/// # Errors
///
/// - [`OAuthError::MalformedRequest`]: missing `shop`, `code` or `hmac`, or
///   a `shop` that is not a `*.myshopify.com` domain
/// - [`OAuthError::AuthenticationFailed`]: the signature does not verify
/// - [`OAuthError::ReplayOrForgedState`]: unknown, consumed, expired or
///   mismatched `state`
/// - [`OAuthError::ExchangeFailed`]: Shopify rejected the code or was
///   unreachable; nothing is stored
/// - [`OAuthError::MetadataFetchFailed`]: the credential **was** stored but
///   shop metadata could not be fetched
/// - [`OAuthError::Store`]: a store failed
pub async fn validate_auth_callback(
    deps: CallbackDeps<'_>,
    query: &AuthQuery,
) -> Result<Installed, OAuthError> {
    let CallbackDeps {
        config,
        http,
        states,
        credentials,
    } = deps;

    // 1. validate
    let shop_param = require(query, "shop")?;
    let code = require(query, "code")?;
    require(query, "hmac")?;
    let shop = ShopDomain::new(shop_param).map_err(|_| OAuthError::MalformedRequest {
        reason: format!("invalid shop domain '{shop_param}'"),
    })?;

    // 2. verify
    if SignatureVerifier::for_oauth(config).verify_query(query.params()) == Verdict::Forged {
        warn!(
            shop = %shop,
            security_event = "oauth_hmac_mismatch",
            "rejected callback with invalid signature"
        );
        return Err(OAuthError::AuthenticationFailed);
    }

    // 3. match and consume state
    let Some(state) = query.get("state") else {
        warn!(shop = %shop, security_event = "oauth_state_missing", "callback without state");
        return Err(OAuthError::ReplayOrForgedState);
    };
    match states.take(&Nonce::from_raw(state)).await? {
        Some(pending) if pending.shop == shop => {}
        Some(pending) => {
            warn!(
                shop = %shop,
                issued_for = %pending.shop,
                security_event = "oauth_state_shop_mismatch",
                "state was issued for a different shop"
            );
            return Err(OAuthError::ReplayOrForgedState);
        }
        None => {
            warn!(
                shop = %shop,
                security_event = "oauth_state_unknown",
                "unknown, expired or reused state"
            );
            return Err(OAuthError::ReplayOrForgedState);
        }
    }

    // 4. exchange
    let admin = AdminClient::new(http.clone(), config, &shop);
    let token = admin.exchange_code(config, code).await.map_err(|e| {
        error!(shop = %shop, status = ?e.status(), error = %e, "token exchange failed");
        OAuthError::exchange(&e)
    })?;

    let scopes = token.scope.parse::<AuthScopes>().unwrap_or_else(|e| {
        warn!(shop = %shop, error = %e, "unparsable granted scopes");
        AuthScopes::new()
    });
    let missing = scopes.missing(config.scopes());
    if !missing.is_empty() {
        warn!(shop = %shop, missing = ?missing, "install granted fewer scopes than requested");
    }

    // 5. enrich
    let metadata = admin
        .with_access_token(&token.access_token)
        .shop_info()
        .await;

    // 6. commit
    let mut credential = ShopCredential::new(shop.clone(), token.access_token, scopes.clone());
    if let Ok(info) = &metadata {
        credential = credential.with_shop_info(info.clone());
    }
    credentials.set(credential).await?;

    let shop_info = metadata.map_err(|e| {
        error!(shop = %shop, error = %e, "credential stored but shop metadata fetch failed");
        OAuthError::MetadataFetchFailed {
            shop: shop.clone(),
            message: e.to_string(),
        }
    })?;

    info!(
        shop = %shop,
        shop_name = shop_info.name.as_deref().unwrap_or_default(),
        scopes = %scopes,
        "shop installed"
    );

    Ok(Installed {
        landing_url: landing_url(config, &shop),
        shop,
        scopes,
        shop_info,
    })
}

/// Where the merchant lands after a successful install.
///
/// Embedded apps open inside the Shopify admin; standalone apps return to
/// the app with `?shop=...&success=true`.
#[must_use]
pub fn landing_url(config: &AppConfig, shop: &ShopDomain) -> String {
    if config.is_embedded() {
        format!("https://{shop}/admin/apps/{}", config.api_key().as_ref())
    } else {
        format!(
            "{}/?shop={}&success=true",
            config.app_url().as_ref(),
            urlencoding::encode(shop.as_ref())
        )
    }
}

fn require<'q>(query: &'q AuthQuery, key: &str) -> Result<&'q str, OAuthError> {
    query.get(key).ok_or_else(|| OAuthError::MalformedRequest {
        reason: format!("missing required parameter '{key}'"),
    })
}
