//! Catalog products and their mapping onto Shopify products.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// Vendor used when a catalog product has no brand.
pub const DEFAULT_VENDOR: &str = "Azan Wholesale";

/// Product type used when a catalog product has no category.
pub const DEFAULT_PRODUCT_TYPE: &str = "General";

/// A product as listed by `GET /api/en/products/by-api`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub mrp_price: f64,
    #[serde(default, deserialize_with = "number_or_string")]
    pub wholesale_price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pictures: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
}

/// The catalog's list envelope: `{success, data, message?}`.
#[derive(Debug, Deserialize)]
pub struct CatalogListing {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<CatalogProduct>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CatalogProduct {
    /// Builds the Shopify `product` object for this catalog product.
    ///
    /// `custom_price` replaces the catalog MRP when given and positive.
    #[must_use]
    pub fn to_shopify_product(&self, custom_price: Option<f64>) -> Value {
        let price = custom_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(self.mrp_price);

        let images: Vec<Value> = self
            .pictures
            .iter()
            .filter(|src| !src.is_empty())
            .map(|src| json!({ "src": src }))
            .collect();

        json!({
            "title": self.name,
            "body_html": self.description,
            "vendor": non_empty(self.brand.as_deref()).unwrap_or(DEFAULT_VENDOR),
            "product_type": non_empty(self.category.as_deref()).unwrap_or(DEFAULT_PRODUCT_TYPE),
            "variants": [{
                "title": "Default",
                "price": price.to_string(),
                "sku": self.sku,
                "inventory_quantity": self.stock,
                "inventory_management": "shopify",
            }],
            "images": images,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.as_f64().unwrap_or_default()),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Value::Null => Ok(0.0),
        other => Err(serde::de::Error::custom(format!(
            "expected a price, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> CatalogProduct {
        serde_json::from_value(json!({
            "id": 7,
            "name": "Tea Kettle",
            "slug": "tea-kettle",
            "sku": "TK-7",
            "mrp_price": "24.5",
            "wholesale_price": 12,
            "stock": 40,
            "description": "<p>Steel</p>",
            "pictures": ["https://img.example.com/1.jpg"],
            "brand": "",
        }))
        .unwrap()
    }

    #[test]
    fn test_mapping_uses_catalog_fields_and_defaults() {
        let shopify = product().to_shopify_product(None);

        assert_eq!(shopify["title"], "Tea Kettle");
        assert_eq!(shopify["body_html"], "<p>Steel</p>");
        assert_eq!(shopify["vendor"], DEFAULT_VENDOR);
        assert_eq!(shopify["product_type"], DEFAULT_PRODUCT_TYPE);
        assert_eq!(shopify["variants"][0]["price"], "24.5");
        assert_eq!(shopify["variants"][0]["sku"], "TK-7");
        assert_eq!(shopify["variants"][0]["inventory_quantity"], 40);
        assert_eq!(shopify["variants"][0]["inventory_management"], "shopify");
        assert_eq!(shopify["images"][0]["src"], "https://img.example.com/1.jpg");
    }

    #[test]
    fn test_custom_price_overrides_mrp() {
        let shopify = product().to_shopify_product(Some(30.0));
        assert_eq!(shopify["variants"][0]["price"], "30");

        let shopify = product().to_shopify_product(Some(0.0));
        assert_eq!(shopify["variants"][0]["price"], "24.5");
    }

    #[test]
    fn test_listing_tolerates_missing_fields() {
        let listing: CatalogListing =
            serde_json::from_value(json!({"success": true, "data": [{"id": 1}]})).unwrap();
        assert!(listing.success);
        assert_eq!(listing.data[0].mrp_price, 0.0);
        assert!(listing.data[0].pictures.is_empty());
    }
}
