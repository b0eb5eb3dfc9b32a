//! Inventory lot types.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::CostFlow;

/// Order in which lots are visited, by receipt date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    Descending,
}

impl LotOrder {
    /// Visiting order for a cost flow. Weighted-average lots share one price
    /// and are drawn oldest first.
    #[must_use]
    pub const fn for_flow(flow: CostFlow) -> Self {
        match flow {
            CostFlow::Lifo => Self::Descending,
            CostFlow::Fifo | CostFlow::WeightedAverage => Self::Ascending,
        }
    }
}

/// One inventory receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLot {
    /// Receipt date.
    pub date: NaiveDateTime,
    /// Inventory account.
    pub account: String,
    /// Unit cost.
    pub price: Decimal,
    /// Remaining quantity, never negative.
    pub quantity: Decimal,
    /// Barcode, if any.
    pub barcode: Option<String>,
    /// Date after which the lot is written off.
    pub expiry: NaiveDateTime,
    /// Author of the receiving entry.
    pub name: String,
    /// Employee of the receiving entry.
    pub employee_name: String,
    /// When the receiving entry was posted.
    pub posted_at: NaiveDateTime,
}

impl InventoryLot {
    /// Cost of the remaining quantity.
    #[must_use]
    pub fn value(&self) -> Decimal {
        self.price * self.quantity
    }
}

/// A lot with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLot {
    /// Row id.
    pub id: i64,
    /// Lot data.
    pub lot: InventoryLot,
}

/// Quantity drawn from one lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotDraw {
    /// Lot row id.
    pub lot_id: i64,
    /// Quantity taken.
    pub taken: Decimal,
    /// Quantity left in the lot afterwards.
    pub remaining: Decimal,
    /// Unit cost of the lot.
    pub price: Decimal,
}

impl LotDraw {
    /// Returns true if the draw empties the lot.
    #[must_use]
    pub fn empties_lot(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Draws covering one outflow, computed before any write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumptionPlan {
    /// Draws in visiting order.
    pub draws: Vec<LotDraw>,
    /// Total cost of the outflow.
    pub cost: Decimal,
}

/// Quantity the lots could not cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    /// Quantity requested.
    pub requested: Decimal,
    /// Quantity missing.
    pub missing: Decimal,
}
