//! Product import from the wholesale catalog into a shop.
//!
//! [`import_product`] looks up one catalog product by id, maps it onto a
//! Shopify product and creates it with the shop's committed access token.
//!
//! | Failure | Variant | Status |
//! |---------|---------|--------|
//! | missing or invalid input | [`ImportError::InvalidRequest`] | 400 |
//! | no catalog credentials | [`ImportError::MissingCredentials`] | 400 |
//! | shop never installed | [`ImportError::ShopNotAuthenticated`] | 401 |
//! | catalog fetch failed | [`ImportError::CatalogUnavailable`] | 502 |
//! | no product with that id | [`ImportError::ProductNotFound`] | 404 |
//! | Shopify rejected the product | [`ImportError::ShopifyRejected`] | 502 |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::catalog::{CatalogCredentials, CatalogProduct, CatalogSettings};
use crate::clients::{AdminClient, CatalogClient};
use crate::config::{AppConfig, ShopDomain};
use crate::store::{CredentialStore, StoreError};

/// Body of `POST /import`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub shop: Option<String>,
    #[serde(default)]
    pub custom_price: Option<f64>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
}

impl ImportRequest {
    /// Catalog credentials carried in the body, when both halves are non-blank.
    #[must_use]
    pub fn credentials(&self) -> Option<CatalogCredentials> {
        match (self.app_id.as_deref(), self.secret_key.as_deref()) {
            (Some(app_id), Some(secret_key)) => CatalogCredentials::new(app_id, secret_key).ok(),
            _ => None,
        }
    }
}

/// A completed import.
///
/// The catalog product is serialized as `azanProduct`, the key existing
/// admin UI callers read.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    #[serde(rename = "azanProduct")]
    pub catalog_product: CatalogProduct,
    pub shopify_product: Value,
}

/// Errors from [`import_product`].
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid import request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Missing catalog API credentials")]
    MissingCredentials,

    #[error("Shop {shop} is not authenticated. Please reinstall the app.")]
    ShopNotAuthenticated { shop: ShopDomain },

    #[error("Failed to fetch products from the catalog: {message}")]
    CatalogUnavailable { message: String },

    #[error("Product {product_id} not found in the catalog")]
    ProductNotFound { product_id: i64 },

    #[error("Shopify rejected the product (status {}): {message}", display_status(.status))]
    ShopifyRejected {
        status: Option<u16>,
        message: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What an import needs from the service.
#[derive(Clone, Copy)]
pub struct ImportDeps<'a> {
    pub config: &'a AppConfig,
    pub http: &'a reqwest::Client,
    pub credentials: &'a dyn CredentialStore,
    pub settings: &'a CatalogSettings,
}

/// Imports one catalog product into `request.shop`.
///
/// Catalog credentials come from the request body, else the runtime
/// settings, else the configuration.
///
/// # Errors
///
/// See the module table.
pub async fn import_product(
    deps: ImportDeps<'_>,
    request: &ImportRequest,
) -> Result<ImportOutcome, ImportError> {
    let product_id = request.product_id.ok_or_else(|| invalid("productId is required"))?;
    let shop_param = request
        .shop
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid("shop is required"))?;
    let shop = ShopDomain::new(shop_param)
        .map_err(|_| invalid(&format!("invalid shop domain '{shop_param}'")))?;

    let catalog_credentials = match request.credentials() {
        Some(credentials) => credentials,
        None => match deps.settings.get().await {
            Some(credentials) => credentials,
            None => deps
                .config
                .catalog_credentials()
                .cloned()
                .ok_or(ImportError::MissingCredentials)?,
        },
    };

    let credential = deps
        .credentials
        .get(&shop)
        .await?
        .ok_or_else(|| ImportError::ShopNotAuthenticated { shop: shop.clone() })?;

    let catalog = CatalogClient::new(
        deps.http.clone(),
        deps.config.catalog_base_url(),
        &catalog_credentials,
    );
    let products = catalog.products().await.map_err(|e| {
        error!(shop = %shop, error = %e, "catalog product listing failed");
        ImportError::CatalogUnavailable {
            message: e.to_string(),
        }
    })?;

    let product = products
        .into_iter()
        .find(|p| p.id == product_id)
        .ok_or(ImportError::ProductNotFound { product_id })?;

    let admin = AdminClient::new(deps.http.clone(), deps.config, &shop)
        .with_access_token(&credential.access_token);
    let created = admin
        .create_product(product.to_shopify_product(request.custom_price))
        .await
        .map_err(|e| {
            error!(shop = %shop, product_id, error = %e, "product creation failed");
            ImportError::ShopifyRejected {
                status: e.status(),
                message: e.to_string(),
            }
        })?;

    let shopify_id = created.get("id").cloned().unwrap_or_default();
    info!(
        shop = %shop,
        product_id,
        sku = %product.sku,
        shopify_id = %shopify_id,
        "product imported"
    );

    Ok(ImportOutcome {
        catalog_product: product,
        shopify_product: created,
    })
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

fn invalid(reason: &str) -> ImportError {
    ImportError::InvalidRequest {
        reason: reason.to_string(),
    }
}
