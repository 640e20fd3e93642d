//! Shopify Admin client for one shop.
//!
//! Covers the three Admin calls the service makes:
//!
//! | Call | Endpoint | Retries |
//! |------|----------|---------|
//! | [`AdminClient::exchange_code`] | `POST /admin/oauth/access_token` | never |
//! | [`AdminClient::shop_info`] | `GET /admin/api/{version}/shop.json` | `metadata_tries` |
//! | [`AdminClient::create_product`] | `POST /admin/api/{version}/products.json` | never |
//!
//! Authorization codes are single-use, so the exchange is never repeated.

use serde::Deserialize;
use serde_json::json;

use crate::auth::{AccessToken, ShopInfo};
use crate::clients::errors::HttpError;
use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{DataType, HttpMethod, HttpRequest};
use crate::config::{AppConfig, ApiVersion, ShopDomain};

/// Header carrying the shop access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Body of a successful authorization-code exchange.
#[derive(Clone, Debug, Deserialize)]
pub struct AccessTokenResponse {
    /// The new access token.
    pub access_token: AccessToken,
    /// Comma-separated granted scopes.
    #[serde(default)]
    pub scope: String,
    /// Lifetime in seconds, present for per-user tokens.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct ShopEnvelope {
    shop: ShopInfo,
}

/// Admin API client bound to one shop.
#[derive(Clone, Debug)]
pub struct AdminClient {
    http: HttpClient,
    api_version: ApiVersion,
    metadata_tries: u32,
}

impl AdminClient {
    /// Creates a client for `shop`.
    ///
    /// Requests go to `https://{shop}` unless the config sets an API host
    /// override, in which case they go there.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &AppConfig, shop: &ShopDomain) -> Self {
        let base_uri = config
            .api_host()
            .map_or_else(|| format!("https://{shop}"), |host| host.as_ref().to_string());

        Self {
            http: HttpClient::new(client, base_uri).with_retry_wait(config.retry_wait()),
            api_version: config.api_version().clone(),
            metadata_tries: config.metadata_tries(),
        }
    }

    /// Authenticates subsequent requests with `token`.
    #[must_use]
    pub fn with_access_token(mut self, token: &AccessToken) -> Self {
        self.http = self.http.with_header(ACCESS_TOKEN_HEADER, token.expose());
        self
    }

    /// Returns the base URI requests are sent to.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        self.http.base_uri()
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on any non-2xx status or network failure, and
    /// [`HttpError::UnexpectedBody`] when the response lacks a token.
    pub async fn exchange_code(
        &self,
        config: &AppConfig,
        code: &str,
    ) -> Result<AccessTokenResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Post, "/admin/oauth/access_token")
            .body(json!({
                "client_id": config.api_key().as_ref(),
                "client_secret": config.api_secret_key().as_ref(),
                "code": code,
            }))
            .body_type(DataType::Json)
            .build()?;

        let response = self.http.request(request).await?;

        // The body holds the token; keep it out of the error text.
        let token: AccessTokenResponse =
            serde_json::from_value(response.body).map_err(|_| HttpError::UnexpectedBody {
                reason: "token response has no access_token".to_string(),
            })?;
        if token.access_token.is_empty() {
            return Err(HttpError::UnexpectedBody {
                reason: "token response has an empty access_token".to_string(),
            });
        }
        Ok(token)
    }

    /// Fetches shop metadata, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] once retries are exhausted or on a
    /// non-retryable status.
    pub async fn shop_info(&self) -> Result<ShopInfo, HttpError> {
        let path = format!("{}/shop.json", self.api_version.admin_path());
        let request = HttpRequest::builder(HttpMethod::Get, path)
            .tries(self.metadata_tries)
            .build()?;

        let response = self.http.request(request).await?;
        let envelope: ShopEnvelope =
            serde_json::from_value(response.body).map_err(|e| HttpError::UnexpectedBody {
                reason: format!("shop.json: {e}"),
            })?;
        Ok(envelope.shop)
    }

    /// Creates a product and returns Shopify's `product` object.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on any non-2xx status or network failure.
    pub async fn create_product(
        &self,
        product: serde_json::Value,
    ) -> Result<serde_json::Value, HttpError> {
        let path = format!("{}/products.json", self.api_version.admin_path());
        let request = HttpRequest::builder(HttpMethod::Post, path)
            .body(json!({ "product": product }))
            .body_type(DataType::Json)
            .build()?;

        let response = self.http.request(request).await?;
        response
            .body
            .get("product")
            .cloned()
            .ok_or_else(|| HttpError::UnexpectedBody {
                reason: "products.json response has no product".to_string(),
            })
    }
}
