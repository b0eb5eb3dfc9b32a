//! Ledger and lot store contracts, plus an in-memory implementation.

pub mod contracts;
pub mod memory;

pub use contracts::{LedgerStore, LotStore};
pub use memory::{BookState, MemoryBook, MemoryUnit};
