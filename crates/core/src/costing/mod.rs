//! Inventory costing.
//!
//! Lots are consumed in receipt order (FIFO), reverse receipt order (LIFO)
//! or at one blended price (weighted average). Consumption is planned
//! before any lot is written.

pub mod engine;
pub mod plan;
pub mod reservations;
pub mod types;

pub use engine::CostingEngine;
pub use plan::plan_consumption;
pub use reservations::LotReservations;
pub use types::{ConsumptionPlan, InventoryLot, LotDraw, LotOrder, Shortfall, StoredLot};

#[cfg(test)]
mod plan_props;
