//! Wholesale catalog API client.

use crate::catalog::{CatalogCredentials, CatalogListing, CatalogProduct, StockUpdate};
use crate::clients::errors::HttpError;
use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{DataType, HttpMethod, HttpRequest};
use crate::config::HostUrl;

/// Product listing path.
pub const PRODUCTS_PATH: &str = "/api/en/products/by-api";

/// Stock adjustment path.
pub const UPDATE_STOCK_PATH: &str = "/api/update-stock";

/// Catalog client authenticated with one credential pair.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: HttpClient,
}

impl CatalogClient {
    /// Creates a client for the catalog at `base_url`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: &HostUrl,
        credentials: &CatalogCredentials,
    ) -> Self {
        let http = HttpClient::new(client, base_url.as_ref())
            .with_header("App-ID", credentials.app_id())
            .with_header("Secret-Key", credentials.secret_key());
        Self { http }
    }

    /// Lists catalog products.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on a failed request, and
    /// [`HttpError::UnexpectedBody`] when the catalog reports
    /// `success: false` or the body is not a listing.
    pub async fn products(&self) -> Result<Vec<CatalogProduct>, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Get, PRODUCTS_PATH).build()?;
        let response = self.http.request(request).await?;

        let listing: CatalogListing =
            serde_json::from_value(response.body).map_err(|e| HttpError::UnexpectedBody {
                reason: format!("product listing: {e}"),
            })?;
        if !listing.success {
            return Err(HttpError::UnexpectedBody {
                reason: listing
                    .message
                    .unwrap_or_else(|| "catalog reported success: false".to_string()),
            });
        }
        Ok(listing.data)
    }

    /// Sends one stock adjustment.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the catalog rejects the update or is
    /// unreachable.
    pub async fn update_stock(&self, update: &StockUpdate) -> Result<(), HttpError> {
        let body = serde_json::to_value(update).map_err(|e| HttpError::UnexpectedBody {
            reason: e.to_string(),
        })?;
        let request = HttpRequest::builder(HttpMethod::Post, UPDATE_STOCK_PATH)
            .body(body)
            .body_type(DataType::Json)
            .build()?;

        self.http.request(request).await?;
        Ok(())
    }
}
