//! Order webhooks.
//!
//! Shopify posts `orders/create` and `orders/updated` deliveries here. Each
//! verified, paid order becomes one catalog stock decrement per SKU line.
//!
//! - [`verify_webhook`]: checks the body signature and reads the headers
//! - [`ShopifyOrder`]: the order fields used to build [`StockUpdate`](crate::catalog::StockUpdate)s
//! - [`ingest_order_webhook`]: the full flow, ending in a [`WebhookOutcome`]
//!
//! Only a bad signature, a malformed body or missing catalog credentials
//! reject a delivery; everything else is acknowledged.

mod errors;
mod ingest;
mod orders;
mod verification;

pub use errors::WebhookError;
pub use ingest::{ingest_order_webhook, IngestDeps, WebhookOutcome, WebhookResponse};
pub use orders::{LineItem, OrderTopic, ShopifyOrder};
pub use verification::{
    verify_webhook, WebhookContext, WebhookRequest, HEADER_CATALOG_APP_ID,
    HEADER_CATALOG_SECRET_KEY, HEADER_HMAC, HEADER_SHOP_DOMAIN, HEADER_TOPIC, HEADER_WEBHOOK_ID,
};
