//! Integration tests for the install flow through the HTTP router.
//!
//! Shopify is stood in for by a wiremock server reached through the API host
//! override, so the full authorize -> callback -> commit path runs without a
//! real shop.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wholesale_sync::auth::oauth::SignatureVerifier;
use wholesale_sync::server::{router, AppState};
use wholesale_sync::store::{CredentialStore, MemoryAuthStateStore, MemoryCredentialStore};
use wholesale_sync::{ApiKey, ApiSecretKey, AppConfig, HostUrl, ShopDomain};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "shpss_integration";
const SHOP: &str = "test.myshopify.com";

struct TestApp {
    state: AppState,
    credentials: Arc<MemoryCredentialStore>,
}

fn test_app(api_host: &str, embedded: bool) -> TestApp {
    let config = AppConfig::builder()
        .api_key(ApiKey::new("integration-key").unwrap())
        .api_secret_key(ApiSecretKey::new(SECRET).unwrap())
        .app_url(HostUrl::new("https://app.example.com").unwrap())
        .api_host(HostUrl::new(api_host).unwrap())
        .is_embedded(embedded)
        .retry_wait(Duration::from_millis(5))
        .build()
        .unwrap();
    let credentials = Arc::new(MemoryCredentialStore::new());
    let states = Arc::new(MemoryAuthStateStore::new(Duration::from_secs(600)));
    let state = AppState::new(config, reqwest::Client::new(), credentials.clone(), states);
    TestApp { state, credentials }
}

async fn get(app: &TestApp, uri: &str) -> (StatusCode, Option<String>, Value) {
    let response = router(app.state.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, location, body)
}

async fn authorize(app: &TestApp) -> String {
    let (status, location, _) = get(app, &format!("/authorize?shop={SHOP}")).await;
    assert_eq!(status, StatusCode::FOUND);
    let location = location.unwrap();
    location
        .split(['?', '&'])
        .find_map(|pair| pair.strip_prefix("state="))
        .unwrap()
        .to_string()
}

fn signed_callback(pairs: &[(&str, &str)]) -> String {
    let mut params: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let hmac = SignatureVerifier::new(ApiSecretKey::new(SECRET).unwrap(), None).sign_query(&params);
    params.push(("hmac".to_string(), hmac));
    encode(&params)
}

fn encode(params: &[(String, String)]) -> String {
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    format!("/callback?{}", query.join("&"))
}

async fn mount_token(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .and(body_partial_json(json!({"client_id": "integration-key"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "scope": "read_products,write_products,read_orders,read_inventory,write_inventory"
        })))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

async fn mount_shop(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/shop.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "shop": {"name": "Test Shop", "email": "owner@test.example", "domain": "test.example"}
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
async fn test_authorize_redirects_to_shopify() {
    let app = test_app("https://unused.example.com", true);
    let (status, location, _) = get(&app, &format!("/authorize?shop={SHOP}")).await;

    assert_eq!(status, StatusCode::FOUND);
    let location = location.unwrap();
    assert!(location.starts_with("https://test.myshopify.com/admin/oauth/authorize?"));
    assert!(location.contains("client_id=integration-key"));
    assert!(location.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback"));
}

#[tokio::test]
async fn test_authorize_without_shop_is_bad_request() {
    let app = test_app("https://unused.example.com", true);
    let (status, location, body) = get(&app, "/authorize").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(location.is_none());
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Shop parameter is required");
}

#[tokio::test]
async fn test_authorize_rejects_foreign_domain() {
    let app = test_app("https://unused.example.com", true);
    let (status, _, body) = get(&app, "/authorize?shop=evil.example.com").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_shop_domain");
}

// ============================================================================
// Callback
// ============================================================================

#[tokio::test]
async fn test_full_install_commits_token_and_redirects_to_admin() {
    let server = MockServer::start().await;
    mount_token(&server, "tok_abc", 1).await;
    mount_shop(&server).await;
    let app = test_app(&server.uri(), true);

    let state = authorize(&app).await;
    let uri = signed_callback(&[
        ("code", "code-1"),
        ("shop", SHOP),
        ("state", &state),
        ("timestamp", "1700000000"),
        ("host", "YWRtaW4uc2hvcGlmeS5jb20vc3RvcmUvdGVzdA"),
    ]);
    let (status, location, _) = get(&app, &uri).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(
        location.as_deref(),
        Some("https://test.myshopify.com/admin/apps/integration-key")
    );

    let shop = ShopDomain::new(SHOP).unwrap();
    let stored = app.credentials.get(&shop).await.unwrap().unwrap();
    assert_eq!(stored.access_token.expose(), "tok_abc");
    assert_eq!(
        stored.shop_info.unwrap().name.as_deref(),
        Some("Test Shop")
    );
}

#[tokio::test]
async fn test_reinstall_overwrites_previous_token() {
    let server = MockServer::start().await;
    mount_token(&server, "tok_first", 1).await;
    mount_token(&server, "tok_second", 1).await;
    mount_shop(&server).await;
    let app = test_app(&server.uri(), false);

    for code in ["code-1", "code-2"] {
        let state = authorize(&app).await;
        let uri = signed_callback(&[("code", code), ("shop", SHOP), ("state", &state)]);
        let (status, location, _) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(
            location.as_deref(),
            Some("https://app.example.com/?shop=test.myshopify.com&success=true")
        );
    }

    let shops = app.credentials.shops().await.unwrap();
    assert_eq!(shops.len(), 1);
    let stored = app.credentials.get(&shops[0]).await.unwrap().unwrap();
    assert_eq!(stored.access_token.expose(), "tok_second");
}

#[tokio::test]
async fn test_tampered_callback_is_rejected_without_network_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = test_app(&server.uri(), true);

    let state = authorize(&app).await;
    let uri = signed_callback(&[("code", "code-1"), ("shop", SHOP), ("state", &state)])
        .replace("code=code-1", "code=code-2");
    let (status, _, body) = get(&app, &uri).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication_failed");
    assert!(app.credentials.shops().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_state_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = test_app(&server.uri(), true);

    let uri = signed_callback(&[("code", "c"), ("shop", SHOP), ("state", "never-issued")]);
    let (status, _, body) = get(&app, &uri).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_state");
}

#[tokio::test]
async fn test_replayed_callback_is_rejected() {
    let server = MockServer::start().await;
    mount_token(&server, "tok_abc", 1).await;
    mount_shop(&server).await;
    let app = test_app(&server.uri(), true);

    let state = authorize(&app).await;
    let uri = signed_callback(&[("code", "code-1"), ("shop", SHOP), ("state", &state)]);

    let (first, _, _) = get(&app, &uri).await;
    let (second, _, _) = get(&app, &uri).await;
    assert_eq!(first, StatusCode::FOUND);
    assert_eq!(second, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_code_is_bad_request() {
    let app = test_app("https://unused.example.com", true);
    let state = authorize(&app).await;
    let uri = signed_callback(&[("shop", SHOP), ("state", &state)]);

    let (status, _, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "malformed_request");
}

#[tokio::test]
async fn test_rejected_code_is_server_error_with_upstream_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_request",
            "error_description": "authorization code was not found"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = test_app(&server.uri(), true);

    let state = authorize(&app).await;
    let uri = signed_callback(&[("code", "stale"), ("shop", SHOP), ("state", &state)]);
    let (status, location, body) = get(&app, &uri).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(location.is_none());
    assert_eq!(body["error"], "exchange_failed");
    assert!(body["message"].as_str().unwrap().contains("not found"));
    assert!(!body["message"].as_str().unwrap().contains(SECRET));
    assert!(app.credentials.shops().await.unwrap().is_empty());
}
