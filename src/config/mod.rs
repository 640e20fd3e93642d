//! Configuration for the wholesale-sync service.
//!
//! - [`AppConfig`]: all service settings, shared read-only by every handler
//! - [`AppConfigBuilder`]: builder for [`AppConfig`]
//! - [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`HostUrl`]: validated newtypes
//! - [`ApiVersion`]: the Shopify Admin API version
//!
//! # Example
//!
//! ```rust
//! use wholesale_sync::{AppConfig, ApiKey, ApiSecretKey, HostUrl};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .app_url(HostUrl::new("https://app.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.redirect_uri(), "https://app.example.com/callback");
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain};
pub use version::ApiVersion;

use std::net::SocketAddr;
use std::time::Duration;

use crate::auth::AuthScopes;
use crate::catalog::CatalogCredentials;
use crate::error::ConfigError;

/// Path the OAuth provider redirects back to.
pub const CALLBACK_PATH: &str = "/callback";

/// Scopes requested when none are configured.
pub const DEFAULT_SCOPES: &str =
    "read_products,write_products,read_orders,read_inventory,write_inventory";

/// Default wholesale catalog API.
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://beta.azanwholesale.com";

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_NONCE_TTL: Duration = Duration::from_secs(600);
const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(1);
const DEFAULT_METADATA_TRIES: u32 = 3;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Service configuration.
///
/// `AppConfig` is `Clone + Send + Sync`; handlers share one instance through
/// [`AppState`](crate::server::AppState).
///
/// # Key Rotation
///
/// `old_api_secret_key` is tried when a signature fails to verify under the
/// primary secret, so in-flight installs and webhooks keep working while the
/// secret is rotated.
#[derive(Clone, Debug)]
pub struct AppConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    webhook_secret: Option<ApiSecretKey>,
    scopes: AuthScopes,
    app_url: HostUrl,
    api_version: ApiVersion,
    api_host: Option<HostUrl>,
    is_embedded: bool,
    online_tokens: bool,
    user_agent_prefix: Option<String>,
    catalog_base_url: HostUrl,
    catalog_credentials: Option<CatalogCredentials>,
    http_timeout: Duration,
    nonce_ttl: Duration,
    retry_wait: Duration,
    metadata_tries: u32,
    bind_addr: SocketAddr,
}

impl AppConfig {
    /// Creates a new builder for constructing an `AppConfig`.
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// Loads configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a local `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] for a missing required variable
    /// and [`ConfigError::InvalidEnvVar`] (or the newtype's own error) for an
    /// unparsable one.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingEnvVar(name));

        let mut builder = Self::builder()
            .api_key(ApiKey::new(require("SHOPIFY_API_KEY")?)?)
            .api_secret_key(ApiSecretKey::new(require("SHOPIFY_API_SECRET")?)?)
            .app_url(HostUrl::new(require("APP_URL")?)?);

        if let Some(old) = get("SHOPIFY_OLD_API_SECRET") {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old)?);
        }
        if let Some(secret) = get("SHOPIFY_WEBHOOK_SECRET") {
            builder = builder.webhook_secret(ApiSecretKey::new(secret)?);
        }
        if let Some(scopes) = get("SHOPIFY_SCOPES") {
            builder = builder.scopes(scopes.parse()?);
        }
        if let Some(version) = get("SHOPIFY_API_VERSION") {
            builder = builder.api_version(version.parse()?);
        }
        if let Some(host) = get("SHOPIFY_API_HOST") {
            builder = builder.api_host(HostUrl::new(host)?);
        }
        if let Some(embedded) = get("SHOPIFY_EMBEDDED") {
            builder = builder.is_embedded(parse_bool("SHOPIFY_EMBEDDED", &embedded)?);
        }
        if let Some(online) = get("SHOPIFY_ONLINE_TOKENS") {
            builder = builder.online_tokens(parse_bool("SHOPIFY_ONLINE_TOKENS", &online)?);
        }
        if let Some(url) = get("CATALOG_BASE_URL") {
            builder = builder.catalog_base_url(HostUrl::new(url)?);
        }
        if let (Some(app_id), Some(secret_key)) = (get("AZAN_APP_ID"), get("AZAN_SECRET_KEY")) {
            builder = builder.catalog_credentials(CatalogCredentials::new(app_id, secret_key)?);
        }
        if let Some(secs) = get("HTTP_TIMEOUT_SECS") {
            builder = builder.http_timeout(Duration::from_secs(parse_u64("HTTP_TIMEOUT_SECS", &secs)?));
        }
        if let Some(secs) = get("NONCE_TTL_SECS") {
            builder = builder.nonce_ttl(Duration::from_secs(parse_u64("NONCE_TTL_SECS", &secs)?));
        }
        if let Some(addr) = get("BIND_ADDR") {
            let addr = addr.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidEnvVar {
                    name: "BIND_ADDR",
                    reason: e.to_string(),
                }
            })?;
            builder = builder.bind_addr(addr);
        }

        builder.build()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the old API secret key, if configured.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the secret used to sign webhook bodies.
    ///
    /// Shopify signs webhooks with the app's API secret unless a dedicated
    /// webhook secret is configured.
    #[must_use]
    pub fn webhook_secret(&self) -> &ApiSecretKey {
        self.webhook_secret.as_ref().unwrap_or(&self.api_secret_key)
    }

    /// Returns the OAuth scopes requested at install.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the app's public base URL.
    #[must_use]
    pub const fn app_url(&self) -> &HostUrl {
        &self.app_url
    }

    /// Returns the absolute OAuth redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        self.app_url.join(CALLBACK_PATH)
    }

    /// Returns the Admin API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the Shopify API host override, if configured.
    ///
    /// When set, every Shopify call goes to this host instead of
    /// `https://{shop}` (proxies and tests).
    #[must_use]
    pub const fn api_host(&self) -> Option<&HostUrl> {
        self.api_host.as_ref()
    }

    /// Returns whether the app is embedded in the Shopify admin.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.is_embedded
    }

    /// Returns whether per-user (online) access tokens are requested.
    #[must_use]
    pub const fn online_tokens(&self) -> bool {
        self.online_tokens
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the wholesale catalog base URL.
    #[must_use]
    pub const fn catalog_base_url(&self) -> &HostUrl {
        &self.catalog_base_url
    }

    /// Returns the catalog credentials configured at startup.
    #[must_use]
    pub const fn catalog_credentials(&self) -> Option<&CatalogCredentials> {
        self.catalog_credentials.as_ref()
    }

    /// Returns the timeout applied to every outbound request.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    /// Returns how long an unconsumed OAuth state nonce stays valid.
    #[must_use]
    pub const fn nonce_ttl(&self) -> Duration {
        self.nonce_ttl
    }

    /// Returns the base wait between retries of idempotent requests.
    #[must_use]
    pub const fn retry_wait(&self) -> Duration {
        self.retry_wait
    }

    /// Returns the number of attempts for the shop metadata fetch.
    #[must_use]
    pub const fn metadata_tries(&self) -> u32 {
        self.metadata_tries
    }

    /// Returns the address the HTTP server binds to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

// Verify AppConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppConfig>();
};

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            name,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_u64(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
        name,
        reason: format!("expected a whole number, got '{value}'"),
    })
}

/// Builder for constructing [`AppConfig`] instances.
///
/// `api_key`, `api_secret_key` and `app_url` are required.
///
/// # Defaults
///
/// - `scopes`: [`DEFAULT_SCOPES`]
/// - `api_version`: 2024-01
/// - `is_embedded`: `true`
/// - `online_tokens`: `true`
/// - `catalog_base_url`: [`DEFAULT_CATALOG_BASE_URL`]
/// - `http_timeout`: 10 s, `nonce_ttl`: 10 min
/// - `retry_wait`: 1 s, `metadata_tries`: 3
/// - `bind_addr`: `0.0.0.0:3000`
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    webhook_secret: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    app_url: Option<HostUrl>,
    api_version: Option<ApiVersion>,
    api_host: Option<HostUrl>,
    is_embedded: Option<bool>,
    online_tokens: Option<bool>,
    user_agent_prefix: Option<String>,
    catalog_base_url: Option<HostUrl>,
    catalog_credentials: Option<CatalogCredentials>,
    http_timeout: Option<Duration>,
    nonce_ttl: Option<Duration>,
    retry_wait: Option<Duration>,
    metadata_tries: Option<u32>,
    bind_addr: Option<SocketAddr>,
}

impl AppConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the previous API secret key for rotation.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets a dedicated webhook signing secret.
    #[must_use]
    pub fn webhook_secret(mut self, key: ApiSecretKey) -> Self {
        self.webhook_secret = Some(key);
        self
    }

    /// Sets the OAuth scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the app's public URL (required).
    #[must_use]
    pub fn app_url(mut self, url: HostUrl) -> Self {
        self.app_url = Some(url);
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Routes Shopify calls to `host` instead of the shop's own domain.
    #[must_use]
    pub fn api_host(mut self, host: HostUrl) -> Self {
        self.api_host = Some(host);
        self
    }

    /// Sets whether the app is embedded in the Shopify admin.
    #[must_use]
    pub const fn is_embedded(mut self, embedded: bool) -> Self {
        self.is_embedded = Some(embedded);
        self
    }

    /// Sets whether per-user (online) tokens are requested.
    #[must_use]
    pub const fn online_tokens(mut self, online: bool) -> Self {
        self.online_tokens = Some(online);
        self
    }

    /// Sets the user agent prefix for outbound requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the catalog base URL.
    #[must_use]
    pub fn catalog_base_url(mut self, url: HostUrl) -> Self {
        self.catalog_base_url = Some(url);
        self
    }

    /// Sets the catalog credentials used when none are supplied at runtime.
    #[must_use]
    pub fn catalog_credentials(mut self, credentials: CatalogCredentials) -> Self {
        self.catalog_credentials = Some(credentials);
        self
    }

    /// Sets the outbound request timeout.
    #[must_use]
    pub const fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Sets the lifetime of unconsumed state nonces.
    #[must_use]
    pub const fn nonce_ttl(mut self, ttl: Duration) -> Self {
        self.nonce_ttl = Some(ttl);
        self
    }

    /// Sets the base wait between retries.
    #[must_use]
    pub const fn retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = Some(wait);
        self
    }

    /// Sets the number of attempts for the shop metadata fetch.
    #[must_use]
    pub const fn metadata_tries(mut self, tries: u32) -> Self {
        self.metadata_tries = Some(tries);
        self
    }

    /// Sets the server bind address.
    #[must_use]
    pub const fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Builds the [`AppConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key`,
    /// `api_secret_key` or `app_url` are not set.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;
        let app_url = self
            .app_url
            .ok_or(ConfigError::MissingRequiredField { field: "app_url" })?;

        let scopes = match self.scopes {
            Some(scopes) => scopes,
            None => DEFAULT_SCOPES.parse()?,
        };
        let catalog_base_url = match self.catalog_base_url {
            Some(url) => url,
            None => HostUrl::new(DEFAULT_CATALOG_BASE_URL)?,
        };
        let bind_addr = match self.bind_addr {
            Some(addr) => addr,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar {
                    name: "BIND_ADDR",
                    reason: DEFAULT_BIND_ADDR.to_string(),
                })?,
        };

        Ok(AppConfig {
            api_key,
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            webhook_secret: self.webhook_secret,
            scopes,
            app_url,
            api_version: self.api_version.unwrap_or_default(),
            api_host: self.api_host,
            is_embedded: self.is_embedded.unwrap_or(true),
            online_tokens: self.online_tokens.unwrap_or(true),
            user_agent_prefix: self.user_agent_prefix,
            catalog_base_url,
            catalog_credentials: self.catalog_credentials,
            http_timeout: self.http_timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT),
            nonce_ttl: self.nonce_ttl.unwrap_or(DEFAULT_NONCE_TTL),
            retry_wait: self.retry_wait.unwrap_or(DEFAULT_RETRY_WAIT),
            metadata_tries: self.metadata_tries.unwrap_or(DEFAULT_METADATA_TRIES).max(1),
            bind_addr,
        })
    }
}
