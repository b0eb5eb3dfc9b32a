//! Invoice pricing.
//!
//! Per-unit discount and tax, item expansion and tiered invoice adjustments.

pub mod service;
pub mod types;

pub use service::PricingCalculator;
pub use types::{InvoiceAdjustment, InvoiceTier, Levy, PriceDiscountTax};
