//! `POST /webhooks/orders`

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};

use crate::catalog::CatalogCredentials;
use crate::server::{ApiError, AppState};
use crate::webhooks::{
    ingest_order_webhook, WebhookRequest, WebhookResponse, HEADER_CATALOG_APP_ID,
    HEADER_CATALOG_SECRET_KEY, HEADER_HMAC, HEADER_SHOP_DOMAIN, HEADER_TOPIC, HEADER_WEBHOOK_ID,
};

/// Acknowledges an order delivery with `200` unless it is rejected.
pub async fn orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let request = webhook_request(&headers, body.to_vec());
    let outcome = ingest_order_webhook(state.ingest_deps(), &request).await?;
    Ok(Json(outcome.to_response()))
}

fn webhook_request(headers: &HeaderMap, body: Vec<u8>) -> WebhookRequest {
    let hmac = header_str(headers, HEADER_HMAC).unwrap_or_default();
    let mut request = WebhookRequest::new(body, hmac);

    if let Some(topic) = header_str(headers, HEADER_TOPIC) {
        request = request.with_topic(topic);
    }
    if let Some(shop) = header_str(headers, HEADER_SHOP_DOMAIN) {
        request = request.with_shop_domain(shop);
    }
    if let Some(id) = header_str(headers, HEADER_WEBHOOK_ID) {
        request = request.with_webhook_id(id);
    }
    let supplied = header_str(headers, HEADER_CATALOG_APP_ID)
        .zip(header_str(headers, HEADER_CATALOG_SECRET_KEY))
        .and_then(|(app_id, secret_key)| CatalogCredentials::new(app_id, secret_key).ok());
    if let Some(credentials) = supplied {
        request = request.with_catalog_credentials(credentials);
    }

    request
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
