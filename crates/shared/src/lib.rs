//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Inventory cost-flow methods
//! - Application-wide error types
//! - Configuration management (database, chart of accounts, posting defaults)

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, ChartConfig};
pub use error::{AppError, AppResult};
