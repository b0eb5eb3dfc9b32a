//! Core posting logic for Tally.
//!
//! This crate contains the double-entry posting engine with ZERO web or
//! database dependencies. Persistence goes through the async store contracts
//! in [`store`]; an in-memory implementation backs the tests.
//!
//! # Modules
//!
//! - `chart` - Chart of accounts, account roles and derived item accounts
//! - `posting` - Batch validation, correction, auto-completion and persistence
//! - `costing` - Inventory lots and FIFO/LIFO/weighted-average costing
//! - `allocation` - Business calendars and time-based value spreading
//! - `pricing` - Item price rows and tiered invoice adjustments
//! - `store` - Ledger and lot store contracts

pub mod allocation;
pub mod chart;
pub mod costing;
pub mod error;
pub mod posting;
pub mod pricing;
pub mod store;

pub use chart::ChartOfAccounts;
pub use error::{PostingError, StoreError};
pub use posting::{Line, PostingOutcome, PostingProcessor, PostingRequest};
pub use store::{LedgerStore, LotStore, MemoryBook};
