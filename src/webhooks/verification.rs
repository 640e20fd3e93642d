//! Webhook signature verification.
//!
//! Shopify signs each delivery with HMAC-SHA256 over the raw body and sends
//! the base64 digest in [`HEADER_HMAC`]. Verification must run against the
//! exact bytes received, before any parsing.
//!
//! # Example
//!
//! ```rust
//! use wholesale_sync::{AppConfig, ApiKey, ApiSecretKey, HostUrl};
//! use wholesale_sync::auth::oauth::SignatureVerifier;
//! use wholesale_sync::webhooks::{verify_webhook, WebhookRequest};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .app_url(HostUrl::new("https://app.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let body = br#"{"id":1}"#.to_vec();
//! let hmac = SignatureVerifier::for_webhooks(&config).sign_body(&body);
//! let request = WebhookRequest::new(body, hmac).with_topic("orders/create");
//!
//! let context = verify_webhook(&config, &request).unwrap();
//! assert_eq!(context.topic_raw(), "orders/create");
//! ```

use tracing::warn;

use crate::auth::oauth::{SignatureVerifier, Verdict};
use crate::catalog::CatalogCredentials;
use crate::config::AppConfig;
use crate::webhooks::orders::OrderTopic;
use crate::webhooks::WebhookError;

/// Base64 HMAC-SHA256 of the body.
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-Sha256";

/// Event topic, e.g. `orders/create`.
pub const HEADER_TOPIC: &str = "X-Shopify-Topic";

/// The `*.myshopify.com` domain of the originating shop.
pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";

/// Unique delivery id.
pub const HEADER_WEBHOOK_ID: &str = "X-Shopify-Webhook-Id";

/// Catalog app id supplied by the caller when none is configured.
pub const HEADER_CATALOG_APP_ID: &str = "x-azan-app-id";

/// Catalog secret key supplied by the caller when none is configured.
pub const HEADER_CATALOG_SECRET_KEY: &str = "x-azan-secret-key";

/// An inbound delivery: raw body plus the headers that matter.
#[derive(Clone, Debug, Default)]
pub struct WebhookRequest {
    body: Vec<u8>,
    hmac_header: String,
    topic: Option<String>,
    shop_domain: Option<String>,
    webhook_id: Option<String>,
    catalog_credentials: Option<CatalogCredentials>,
}

impl WebhookRequest {
    /// Creates a request from the raw body and the HMAC header value.
    #[must_use]
    pub fn new(body: Vec<u8>, hmac_header: impl Into<String>) -> Self {
        Self {
            body,
            hmac_header: hmac_header.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    #[must_use]
    pub fn with_shop_domain(mut self, shop: impl Into<String>) -> Self {
        self.shop_domain = Some(shop.into());
        self
    }

    #[must_use]
    pub fn with_webhook_id(mut self, id: impl Into<String>) -> Self {
        self.webhook_id = Some(id.into());
        self
    }

    /// Attaches catalog credentials taken from request headers.
    #[must_use]
    pub fn with_catalog_credentials(mut self, credentials: CatalogCredentials) -> Self {
        self.catalog_credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn hmac_header(&self) -> &str {
        &self.hmac_header
    }

    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    #[must_use]
    pub fn shop_domain(&self) -> Option<&str> {
        self.shop_domain.as_deref()
    }

    #[must_use]
    pub fn webhook_id(&self) -> Option<&str> {
        self.webhook_id.as_deref()
    }

    /// Catalog credentials supplied with the request, if any.
    #[must_use]
    pub const fn catalog_credentials(&self) -> Option<&CatalogCredentials> {
        self.catalog_credentials.as_ref()
    }
}

/// Headers of a delivery whose signature verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookContext {
    topic: Option<OrderTopic>,
    topic_raw: String,
    shop_domain: Option<String>,
    webhook_id: Option<String>,
}

impl WebhookContext {
    /// The order topic, `None` for any topic this service does not handle.
    #[must_use]
    pub const fn topic(&self) -> Option<OrderTopic> {
        self.topic
    }

    /// The topic header as received, empty when absent.
    #[must_use]
    pub fn topic_raw(&self) -> &str {
        &self.topic_raw
    }

    #[must_use]
    pub fn shop_domain(&self) -> Option<&str> {
        self.shop_domain.as_deref()
    }

    #[must_use]
    pub fn webhook_id(&self) -> Option<&str> {
        self.webhook_id.as_deref()
    }
}

/// Verifies a delivery against the webhook secret, falling back to the old
/// API secret during rotation.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidHmac`] if the signature is absent,
/// undecodable, or does not match.
pub fn verify_webhook(
    config: &AppConfig,
    request: &WebhookRequest,
) -> Result<WebhookContext, WebhookError> {
    let verdict = SignatureVerifier::for_webhooks(config)
        .verify_body(request.body(), request.hmac_header());

    if verdict == Verdict::Forged {
        warn!(
            shop = request.shop_domain().unwrap_or_default(),
            webhook_id = request.webhook_id().unwrap_or_default(),
            security_event = "webhook_hmac_mismatch",
            "rejected webhook with invalid signature"
        );
        return Err(WebhookError::InvalidHmac);
    }

    let topic_raw = request.topic().unwrap_or_default().to_string();
    Ok(WebhookContext {
        topic: OrderTopic::parse(&topic_raw),
        topic_raw,
        shop_domain: request.shop_domain.clone(),
        webhook_id: request.webhook_id.clone(),
    })
}
