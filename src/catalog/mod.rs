//! The wholesale catalog domain.
//!
//! - [`CatalogCredentials`]: `App-ID` / `Secret-Key` pair, secret masked
//! - [`CatalogSettings`]: the credentials currently in effect
//! - [`CatalogProduct`]: a catalog listing entry and its Shopify mapping
//! - [`StockUpdate`]: one stock adjustment sent to the catalog
//! - [`import`]: the product import flow

mod credentials;
pub mod import;
mod product;
mod settings;
mod stock;

pub use credentials::{CatalogCredentials, CredentialSummary};
pub use import::{import_product, ImportError, ImportOutcome, ImportRequest};
pub use product::{CatalogListing, CatalogProduct, DEFAULT_PRODUCT_TYPE, DEFAULT_VENDOR};
pub use settings::CatalogSettings;
pub use stock::{FailedStockUpdate, StockAction, StockUpdate};
