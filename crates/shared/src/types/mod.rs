//! Common types used across the application.

pub mod cost_flow;

pub use cost_flow::CostFlow;
