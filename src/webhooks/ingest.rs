//! Order webhook ingestion.
//!
//! [`ingest_order_webhook`] turns a verified order delivery into catalog
//! stock decrements. Every decrement is sent independently and concurrently;
//! one failing SKU never blocks the others, and failures are reported per
//! SKU in the outcome.

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{CatalogCredentials, CatalogSettings, FailedStockUpdate, StockUpdate};
use crate::clients::CatalogClient;
use crate::config::AppConfig;
use crate::webhooks::orders::ShopifyOrder;
use crate::webhooks::verification::{verify_webhook, WebhookRequest};
use crate::webhooks::WebhookError;

/// What ingestion needs from the service.
#[derive(Clone, Copy)]
pub struct IngestDeps<'a> {
    pub config: &'a AppConfig,
    pub http: &'a reqwest::Client,
    pub settings: &'a CatalogSettings,
}

/// An acknowledged delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The topic is not an order topic this service handles.
    UnsupportedTopic {
        topic: String,
    },
    /// The signed body is not an order. Acknowledged so Shopify stops
    /// redelivering it.
    MalformedPayload {
        reason: String,
    },
    /// The order is not paid yet.
    SkippedUnpaid {
        order_id: Option<u64>,
    },
    /// No line item carries a SKU.
    NoStockItems {
        order_id: Option<u64>,
    },
    /// Decrements were sent; `failed` lists the ones the catalog rejected.
    Processed {
        order_id: Option<u64>,
        updates: Vec<StockUpdate>,
        failed: Vec<FailedStockUpdate>,
    },
}

impl WebhookOutcome {
    /// `false` when the body was unusable or some decrement failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::MalformedPayload { .. } => false,
            Self::Processed { failed, .. } => failed.is_empty(),
            _ => true,
        }
    }

    /// Human-readable summary.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::UnsupportedTopic { topic } => format!("Unsupported webhook topic '{topic}', ignored"),
            Self::MalformedPayload { reason } => format!("Malformed webhook payload: {reason}"),
            Self::SkippedUnpaid { .. } => "Order not paid, skipping stock update".to_string(),
            Self::NoStockItems { .. } => "No items with SKU found in order".to_string(),
            Self::Processed { updates, failed, .. } if failed.is_empty() => {
                format!("Stock updates processed for {} items", updates.len())
            }
            Self::Processed { updates, failed, .. } => format!(
                "Stock updates processed for {} items, {} failed",
                updates.len() - failed.len(),
                failed.len()
            ),
        }
    }

    /// The JSON acknowledgment body.
    #[must_use]
    pub fn to_response(&self) -> WebhookResponse {
        let (order_id, updates, failed) = match self {
            Self::UnsupportedTopic { .. } | Self::MalformedPayload { .. } => (None, None, None),
            Self::SkippedUnpaid { order_id } | Self::NoStockItems { order_id } => {
                (*order_id, None, None)
            }
            Self::Processed {
                order_id,
                updates,
                failed,
            } => (*order_id, Some(updates.clone()), Some(failed.clone())),
        };
        WebhookResponse {
            success: self.is_success(),
            message: self.message(),
            updates,
            failed,
            order_id,
        }
    }
}

/// Body of a `200` webhook acknowledgment.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updates: Option<Vec<StockUpdate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<Vec<FailedStockUpdate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<u64>,
}

/// Verifies and processes an order delivery.
///
/// Steps, in order: verify the signature; ignore other topics; parse the
/// order (an unparsable body is acknowledged as [`WebhookOutcome::MalformedPayload`]);
/// skip unpaid orders; collect SKU lines; resolve catalog credentials
/// (runtime settings, then config, then the request headers); fan out.
///
/// # Errors
///
/// - [`WebhookError::InvalidHmac`] before anything else is read
/// - [`WebhookError::MissingCredentials`] when there are decrements to send
///   but no catalog credentials
pub async fn ingest_order_webhook(
    deps: IngestDeps<'_>,
    request: &WebhookRequest,
) -> Result<WebhookOutcome, WebhookError> {
    let context = verify_webhook(deps.config, request)?;
    let shop = context.shop_domain().unwrap_or_default();

    let Some(topic) = context.topic() else {
        info!(shop, topic = context.topic_raw(), "ignoring unsupported webhook topic");
        return Ok(WebhookOutcome::UnsupportedTopic {
            topic: context.topic_raw().to_string(),
        });
    };

    let order: ShopifyOrder = match serde_json::from_slice(request.body()) {
        Ok(order) => order,
        Err(e) => {
            warn!(shop, %topic, error = %e, "unparsable order payload, acknowledging");
            return Ok(WebhookOutcome::MalformedPayload {
                reason: e.to_string(),
            });
        }
    };

    if !order.is_paid() {
        info!(shop, %topic, order_id = ?order.id, "order not paid, skipping");
        return Ok(WebhookOutcome::SkippedUnpaid { order_id: order.id });
    }

    let updates = order.stock_updates();
    if updates.is_empty() {
        info!(shop, %topic, order_id = ?order.id, "order has no SKU items");
        return Ok(WebhookOutcome::NoStockItems { order_id: order.id });
    }

    let credentials = resolve_credentials(deps, request)
        .await
        .ok_or(WebhookError::MissingCredentials)?;

    let client = CatalogClient::new(
        deps.http.clone(),
        deps.config.catalog_base_url(),
        &credentials,
    );
    let failed = send_all(&client, &updates).await;

    info!(
        shop,
        %topic,
        order_id = ?order.id,
        sent = updates.len(),
        failed = failed.len(),
        "stock updates forwarded"
    );

    Ok(WebhookOutcome::Processed {
        order_id: order.id,
        updates,
        failed,
    })
}

async fn resolve_credentials(
    deps: IngestDeps<'_>,
    request: &WebhookRequest,
) -> Option<CatalogCredentials> {
    if let Some(credentials) = deps.settings.get().await {
        return Some(credentials);
    }
    deps.config
        .catalog_credentials()
        .or_else(|| request.catalog_credentials())
        .cloned()
}

async fn send_all(client: &CatalogClient, updates: &[StockUpdate]) -> Vec<FailedStockUpdate> {
    let results = join_all(updates.iter().map(|update| async move {
        client.update_stock(update).await.map_err(|e| {
            warn!(sku = %update.sku, quantity = update.quantity, error = %e, "stock update failed");
            FailedStockUpdate {
                sku: update.sku.clone(),
                quantity: update.quantity,
                error: e.to_string(),
            }
        })
    }))
    .await;

    results.into_iter().filter_map(Result::err).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth::SignatureVerifier;
    use crate::config::{ApiKey, ApiSecretKey, HostUrl};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(catalog: &str) -> AppConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("hook-secret").unwrap())
            .app_url(HostUrl::new("https://app.example.com").unwrap())
            .catalog_base_url(HostUrl::new(catalog).unwrap())
            .build()
            .unwrap()
    }

    fn delivery(config: &AppConfig, body: &serde_json::Value) -> WebhookRequest {
        let body = serde_json::to_vec(body).unwrap();
        let hmac = SignatureVerifier::for_webhooks(config).sign_body(&body);
        WebhookRequest::new(body, hmac).with_topic("orders/create")
    }

    #[tokio::test]
    async fn test_one_failing_sku_does_not_block_others() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/update-stock"))
            .and(body_partial_json(json!({"sku": "BAD"})))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({"message": "unknown sku"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/update-stock"))
            .and(header("App-ID", "app"))
            .and(header("Secret-Key", "sk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(2)
            .mount(&server)
            .await;

        let config = config(&server.uri());
        let settings = CatalogSettings::new(Some(CatalogCredentials::new("app", "sk").unwrap()));
        let request = delivery(
            &config,
            &json!({
                "id": 55,
                "financial_status": "paid",
                "line_items": [
                    {"sku": "GOOD-1", "quantity": 1},
                    {"sku": "BAD", "quantity": 3},
                    {"sku": "GOOD-2", "quantity": 2}
                ]
            }),
        );
        let deps = IngestDeps {
            config: &config,
            http: &reqwest::Client::new(),
            settings: &settings,
        };

        let outcome = ingest_order_webhook(deps, &request).await.unwrap();
        match outcome {
            WebhookOutcome::Processed {
                order_id,
                updates,
                failed,
            } => {
                assert_eq!(order_id, Some(55));
                assert_eq!(updates.len(), 3);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].sku, "BAD");
                assert_eq!(failed[0].quantity, 3);
            }
            other => panic!("expected Processed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_header_credentials_used_when_none_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/update-stock"))
            .and(header("App-ID", "from-header"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let config = config(&server.uri());
        let settings = CatalogSettings::default();
        let request = delivery(
            &config,
            &json!({"financial_status": "paid", "line_items": [{"sku": "A", "quantity": 1}]}),
        )
        .with_catalog_credentials(CatalogCredentials::new("from-header", "sk").unwrap());
        let deps = IngestDeps {
            config: &config,
            http: &reqwest::Client::new(),
            settings: &settings,
        };

        let outcome = ingest_order_webhook(deps, &request).await.unwrap();
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_missing_credentials_is_an_error() {
        let config = config("http://127.0.0.1:9");
        let settings = CatalogSettings::default();
        let request = delivery(
            &config,
            &json!({"financial_status": "paid", "line_items": [{"sku": "A", "quantity": 1}]}),
        );
        let deps = IngestDeps {
            config: &config,
            http: &reqwest::Client::new(),
            settings: &settings,
        };

        let result = ingest_order_webhook(deps, &request).await;
        assert!(matches!(result, Err(WebhookError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_unparsable_body_is_acknowledged_as_failure() {
        let config = config("http://127.0.0.1:9");
        let settings = CatalogSettings::default();
        let body = b"{not json".to_vec();
        let hmac = SignatureVerifier::for_webhooks(&config).sign_body(&body);
        let request = WebhookRequest::new(body, hmac).with_topic("orders/create");
        let deps = IngestDeps {
            config: &config,
            http: &reqwest::Client::new(),
            settings: &settings,
        };

        let outcome = ingest_order_webhook(deps, &request).await.unwrap();
        assert!(matches!(outcome, WebhookOutcome::MalformedPayload { .. }));
        let body = serde_json::to_value(outcome.to_response()).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().starts_with("Malformed webhook payload"));
    }

    #[test]
    fn test_partial_failure_message_and_flag() {
        let outcome = WebhookOutcome::Processed {
            order_id: Some(1),
            updates: vec![StockUpdate::decrease("A", 1), StockUpdate::decrease("B", 1)],
            failed: vec![FailedStockUpdate {
                sku: "B".to_string(),
                quantity: 1,
                error: "HTTP 500".to_string(),
            }],
        };
        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), "Stock updates processed for 1 items, 1 failed");
    }

    #[test]
    fn test_acks_serialize_without_empty_fields() {
        let body = serde_json::to_value(
            WebhookOutcome::SkippedUnpaid { order_id: Some(9) }.to_response(),
        )
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": true,
                "message": "Order not paid, skipping stock update",
                "orderId": 9
            })
        );

        let body = serde_json::to_value(
            WebhookOutcome::UnsupportedTopic { topic: "carts/update".to_string() }.to_response(),
        )
        .unwrap();
        assert_eq!(body["success"], true);
        assert!(body.get("orderId").is_none());
    }
}
