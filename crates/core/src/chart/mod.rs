//! Chart of accounts.
//!
//! Classifies every account name into exactly one role and carries the
//! price rows of inventory and service accounts.

pub mod accounts;
pub mod names;
pub mod types;

pub use accounts::ChartOfAccounts;
pub use types::{Account, AccountRole, NormalSide, Tracking};
