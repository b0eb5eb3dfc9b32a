//! Inventory cost-flow methods.
//!
//! The cost flow decides which inventory lots are depleted, and at what cost,
//! when stock leaves the books.

use serde::{Deserialize, Serialize};

/// Cost-flow method configured for an inventory-tracked account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFlow {
    /// First in, first out: oldest lots are consumed first.
    Fifo,
    /// Last in, first out: newest lots are consumed first.
    Lifo,
    /// Every lot carries one blended price derived from the ledger.
    #[serde(alias = "wma", alias = "average")]
    WeightedAverage,
}

impl CostFlow {
    /// Returns true if lots of this account are repriced after every movement.
    #[must_use]
    pub const fn is_weighted_average(self) -> bool {
        matches!(self, Self::WeightedAverage)
    }
}

impl std::fmt::Display for CostFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fifo => write!(f, "FIFO"),
            Self::Lifo => write!(f, "LIFO"),
            Self::WeightedAverage => write!(f, "WMA"),
        }
    }
}

impl std::str::FromStr for CostFlow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FIFO" => Ok(Self::Fifo),
            "LIFO" => Ok(Self::Lifo),
            "WMA" | "AVERAGE" | "WEIGHTED_AVERAGE" => Ok(Self::WeightedAverage),
            _ => Err(format!("Unknown cost flow: {s}")),
        }
    }
}
