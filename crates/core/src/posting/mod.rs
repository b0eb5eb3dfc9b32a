//! Journal posting.
//!
//! This module implements the posting pipeline:
//! - Account resolution and aggregation
//! - Correction by reversal
//! - Auto-completion of sales and services
//! - Balance and solvency validation
//! - Allocation of adjusting entries and persistence

pub mod aggregate;
pub mod autocomplete;
pub mod invoice;
pub mod processor;
pub mod reversal;
pub mod types;
pub mod validation;

pub use aggregate::aggregate;
pub use autocomplete::AutoCompleter;
pub use invoice::invoice_view;
pub use processor::PostingProcessor;
pub use reversal::{PendingReversal, ReversalService};
pub use types::{
    AdjustingMethod, EntryHeader, InvoiceLine, Line, PostedLine, PostingOutcome, PostingRequest,
};
pub use validation::BALANCE_TOLERANCE;

#[cfg(test)]
mod aggregate_props;
