//! Integration tests for catalog settings, product import and health.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wholesale_sync::server::{router, AppState};
use wholesale_sync::store::{CredentialStore, MemoryAuthStateStore, MemoryCredentialStore};
use wholesale_sync::{AccessToken, ApiKey, ApiSecretKey, AppConfig, HostUrl, ShopCredential, ShopDomain};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn state(upstream: &str, installed: bool) -> AppState {
    let config = AppConfig::builder()
        .api_key(ApiKey::new("key").unwrap())
        .api_secret_key(ApiSecretKey::new("secret").unwrap())
        .app_url(HostUrl::new("https://app.example.com").unwrap())
        .api_host(HostUrl::new(upstream).unwrap())
        .catalog_base_url(HostUrl::new(upstream).unwrap())
        .build()
        .unwrap();

    let credentials = Arc::new(MemoryCredentialStore::new());
    if installed {
        credentials
            .set(ShopCredential::new(
                ShopDomain::new("test.myshopify.com").unwrap(),
                AccessToken::new("shpat_installed"),
                "write_products".parse().unwrap(),
            ))
            .await
            .unwrap();
    }

    AppState::new(
        config,
        reqwest::Client::new(),
        credentials,
        Arc::new(MemoryAuthStateStore::new(Duration::from_secs(600))),
    )
}

async fn call(state: AppState, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = builder
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/en/products/by-api"))
        .and(header("App-ID", "azan-app"))
        .and(header("Secret-Key", "azan-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {
                    "id": 11, "name": "Medjool Dates", "slug": "medjool-dates",
                    "sku": "DATES-500", "mrp_price": "9.50", "wholesale_price": "6.00",
                    "stock": 120, "description": "<p>Premium</p>",
                    "pictures": ["https://cdn.example.com/dates.jpg"],
                    "category": "Dry Fruits", "brand": null
                }
            ]
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
async fn test_settings_round_trip_masks_secret() {
    let state = state("https://unused.example.com", false).await;

    let (status, body) = call(state.clone(), "GET", "/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "config": null}));

    let (status, body) = call(
        state.clone(),
        "POST",
        "/config",
        Some(r#"{"appId":"azan-app","secretKey":"azan-secret"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Configuration saved successfully");
    assert!(!body.to_string().contains("azan-secret"));

    let (_, body) = call(state, "GET", "/config", None).await;
    assert_eq!(
        body["config"],
        json!({"appId": "azan-app", "secretKeySet": true})
    );
}

#[tokio::test]
async fn test_settings_require_both_fields() {
    let state = state("https://unused.example.com", false).await;

    let (status, body) = call(state.clone(), "POST", "/config", Some(r#"{"appId":"azan-app"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = call(state, "POST", "/config", Some("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Import
// ============================================================================

#[tokio::test]
async fn test_import_creates_shopify_product() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-01/products.json"))
        .and(header("X-Shopify-Access-Token", "shpat_installed"))
        .and(body_partial_json(json!({
            "product": {
                "title": "Medjool Dates",
                "vendor": "Azan Wholesale",
                "product_type": "Dry Fruits",
                "variants": [{"price": "12.75", "sku": "DATES-500", "inventory_quantity": 120}]
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "product": {"id": 632910392, "title": "Medjool Dates"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = state(&server.uri(), true).await;
    let (status, body) = call(
        state,
        "POST",
        "/import",
        Some(
            r#"{"productId":11,"shop":"test.myshopify.com","customPrice":12.75,
               "appId":"azan-app","secretKey":"azan-secret"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Product imported successfully");
    assert_eq!(body["azanProduct"]["sku"], "DATES-500");
    assert!(body.get("catalogProduct").is_none());
    assert_eq!(body["shopifyProduct"]["id"], 632910392);
}

#[tokio::test]
async fn test_import_uses_saved_settings_when_body_has_no_credentials() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-01/products.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"product": {"id": 1}})))
        .expect(1)
        .mount(&server)
        .await;

    let state = state(&server.uri(), true).await;
    call(
        state.clone(),
        "POST",
        "/config",
        Some(r#"{"appId":"azan-app","secretKey":"azan-secret"}"#),
    )
    .await;

    let (status, _) = call(
        state,
        "POST",
        "/import",
        Some(r#"{"productId":11,"shop":"test.myshopify.com"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_import_for_uninstalled_shop_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = state(&server.uri(), false).await;
    let (status, body) = call(
        state,
        "POST",
        "/import",
        Some(r#"{"productId":11,"shop":"test.myshopify.com","appId":"a","secretKey":"s"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "shop_not_authenticated");
}

#[tokio::test]
async fn test_import_of_unknown_product_is_not_found() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let state = state(&server.uri(), true).await;
    let (status, body) = call(
        state,
        "POST",
        "/import",
        Some(r#"{"productId":999,"shop":"test.myshopify.com","appId":"azan-app","secretKey":"azan-secret"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "product_not_found");
}

#[tokio::test]
async fn test_shopify_rejection_is_bad_gateway() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-01/products.json"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": {"title": ["can't be blank"]}
        })))
        .mount(&server)
        .await;

    let state = state(&server.uri(), true).await;
    let (status, body) = call(
        state,
        "POST",
        "/import",
        Some(r#"{"productId":11,"shop":"test.myshopify.com","appId":"azan-app","secretKey":"azan-secret"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["message"].as_str().unwrap().contains("422"));
}

#[tokio::test]
async fn test_import_requires_product_and_shop() {
    let state = state("https://unused.example.com", true).await;
    let (status, body) = call(state, "POST", "/import", Some(r#"{"shop":"test.myshopify.com"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_version() {
    let state = state("https://unused.example.com", false).await;
    let (status, body) = call(state, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}
