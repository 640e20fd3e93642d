//! Order payloads and the stock adjustments they imply.

use serde::Deserialize;
use std::fmt;

use crate::catalog::StockUpdate;

/// Order topics that adjust catalog stock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderTopic {
    /// `orders/create`
    OrdersCreate,
    /// `orders/updated`
    OrdersUpdated,
}

impl OrderTopic {
    /// Parses a topic header; `None` for any other topic.
    #[must_use]
    pub fn parse(topic: &str) -> Option<Self> {
        match topic.trim() {
            "orders/create" => Some(Self::OrdersCreate),
            "orders/updated" => Some(Self::OrdersUpdated),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrdersCreate => "orders/create",
            Self::OrdersUpdated => "orders/updated",
        }
    }
}

impl fmt::Display for OrderTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields of a Shopify order webhook this service reads.
///
/// Unknown fields are ignored; missing ones default.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ShopifyOrder {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub order_number: Option<u64>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// One order line.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub variant_id: Option<u64>,
}

impl ShopifyOrder {
    /// Returns `true` when `financial_status` is exactly `paid`.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.financial_status.as_deref() == Some("paid")
    }

    /// One decrement per line item that carries a non-blank SKU, in order.
    #[must_use]
    pub fn stock_updates(&self) -> Vec<StockUpdate> {
        self.line_items
            .iter()
            .filter_map(|item| {
                let sku = item.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
                Some(StockUpdate::decrease(sku, item.quantity))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(value: serde_json::Value) -> ShopifyOrder {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_topic_parse() {
        assert_eq!(OrderTopic::parse("orders/create"), Some(OrderTopic::OrdersCreate));
        assert_eq!(OrderTopic::parse("orders/updated"), Some(OrderTopic::OrdersUpdated));
        assert_eq!(OrderTopic::parse("orders/paid"), None);
        assert_eq!(OrderTopic::parse(""), None);
        assert_eq!(OrderTopic::OrdersCreate.to_string(), "orders/create");
    }

    #[test]
    fn test_only_paid_is_paid() {
        assert!(order(json!({"financial_status": "paid"})).is_paid());
        for status in ["pending", "partially_paid", "refunded", "PAID"] {
            assert!(!order(json!({"financial_status": status})).is_paid(), "{status}");
        }
        assert!(!order(json!({})).is_paid());
    }

    #[test]
    fn test_stock_updates_skip_items_without_sku() {
        let order = order(json!({
            "id": 1001,
            "financial_status": "paid",
            "line_items": [
                {"id": 1, "sku": "A-1", "quantity": 2, "title": "Dates"},
                {"id": 2, "sku": "", "quantity": 1, "title": "Gift card"},
                {"id": 3, "quantity": 5, "title": "No SKU"},
                {"id": 4, "sku": "B-2", "quantity": 1, "title": "Oil"}
            ]
        }));

        assert_eq!(
            order.stock_updates(),
            vec![StockUpdate::decrease("A-1", 2), StockUpdate::decrease("B-2", 1)]
        );
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let order = order(json!({
            "id": 7,
            "created_at": "2024-01-01T00:00:00Z",
            "fulfillment_status": null,
            "line_items": []
        }));
        assert_eq!(order.id, Some(7));
        assert!(order.stock_updates().is_empty());
    }
}
