//! Stock adjustments pushed to the wholesale catalog.

use serde::{Deserialize, Serialize};

/// Direction of a stock adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockAction {
    /// Reduce catalog stock.
    Decrease,
}

/// Body of `POST /api/update-stock`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub sku: String,
    pub quantity: u32,
    pub action: StockAction,
}

impl StockUpdate {
    /// A decrement of `quantity` units of `sku`.
    #[must_use]
    pub fn decrease(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
            action: StockAction::Decrease,
        }
    }
}

/// A stock update the catalog did not accept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedStockUpdate {
    pub sku: String,
    pub quantity: u32,
    pub error: String,
}
