//! Time-based allocation of adjusting entries.
//!
//! A lump value is spread over the business windows between its posting
//! date and its expiry date.

pub mod calendar;
pub mod curve;

pub use calendar::{BusinessCalendar, Window, WindowInstance, WindowSpec};
pub use curve::{AllocatedLine, AllocationEngine, Curve};

#[cfg(test)]
mod curve_props;
