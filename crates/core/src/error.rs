//! Posting error types.
//!
//! Every failure is request-scoped: the batch is rejected as a whole and the
//! caller decides how to surface it.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tally_shared::AppError;
use thiserror::Error;

/// Failure reported by a ledger or lot store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("Store backend error: {0}")]
    Backend(String),

    /// The backend could not serialize this unit of work with a concurrent one.
    #[error("Serialization conflict, please retry")]
    Conflict,
}

/// Errors that can occur while posting a batch.
#[derive(Debug, Error)]
pub enum PostingError {
    // ========== Configuration Errors ==========
    /// Duplicate or unknown account, or an otherwise invalid chart.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Business calendar failed validation.
    #[error("Invalid calendar: {0}")]
    InvalidCalendar(String),

    /// Expiry date and adjusting method do not go together.
    #[error("Adjusting method {method} does not match the expiry date (expiry given: {expiry_given})")]
    ConfigurationMismatch {
        /// The adjusting method requested.
        method: String,
        /// Whether an expiry date was supplied.
        expiry_given: bool,
    },

    // ========== Validation Errors ==========
    /// A line without an account carried an unknown or missing barcode.
    #[error("Cannot resolve an account for barcode {0:?}")]
    UnresolvedBarcode(String),

    /// Inventory accounts only accept the `expire` method or none.
    #[error("Adjusting method {method} cannot be used with inventory account {account}")]
    InvalidAdjustingMethod {
        /// The inventory account.
        account: String,
        /// The adjusting method requested.
        method: String,
    },

    /// Posting date falls after the expiry date.
    #[error("Posting date {date} is after expiry date {expiry}")]
    InvalidDateRange {
        /// Posting date.
        date: NaiveDateTime,
        /// Expiry date.
        expiry: NaiveDateTime,
    },

    /// Value and quantity of a line have opposite signs.
    #[error("Value {value} and quantity {quantity} of account {account} have opposite signs")]
    SignMismatch {
        /// The account of the line.
        account: String,
        /// Line value.
        value: Decimal,
        /// Line quantity.
        quantity: Decimal,
    },

    // ========== Business Rule Errors ==========
    /// The line would drive a non-equity balance below zero.
    #[error("Insufficient balance on {account}: balance {balance}, movement {value}")]
    InsufficientBalance {
        /// The account of the line.
        account: String,
        /// Balance before the line.
        balance: Decimal,
        /// Line value.
        value: Decimal,
    },

    /// Debit-normal and credit-normal movements do not cancel out.
    #[error("Entry is not balanced, debit minus credit is {difference}")]
    UnbalancedEntry {
        /// Signed total of the batch.
        difference: Decimal,
    },

    /// The entry to correct has no active lines.
    #[error("No active lines found for entry {0}")]
    NoPriorEntry(i64),

    /// Not enough stock in the lots of the account.
    #[error("Inventory shortage on {account}: requested {requested}, short by {shortfall}")]
    InventoryShortage {
        /// The inventory account.
        account: String,
        /// Barcode of the lots, if any.
        barcode: Option<String>,
        /// Quantity requested.
        requested: Decimal,
        /// Quantity missing.
        shortfall: Decimal,
    },

    // ========== Store Errors ==========
    /// Ledger or lot store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PostingError {
    /// Returns the error code for structured output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidCalendar(_) => "INVALID_CALENDAR",
            Self::ConfigurationMismatch { .. } => "CONFIGURATION_MISMATCH",
            Self::UnresolvedBarcode(_) => "UNRESOLVED_BARCODE",
            Self::InvalidAdjustingMethod { .. } => "INVALID_ADJUSTING_METHOD",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::SignMismatch { .. } => "SIGN_MISMATCH",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::NoPriorEntry(_) => "NO_PRIOR_ENTRY",
            Self::InventoryShortage { .. } => "INVENTORY_SHORTAGE",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<PostingError> for AppError {
    fn from(err: PostingError) -> Self {
        let message = err.to_string();
        match err {
            PostingError::Configuration(_)
            | PostingError::InvalidCalendar(_)
            | PostingError::ConfigurationMismatch { .. } => Self::Configuration(message),
            PostingError::UnresolvedBarcode(_)
            | PostingError::InvalidAdjustingMethod { .. }
            | PostingError::InvalidDateRange { .. }
            | PostingError::SignMismatch { .. } => Self::Validation(message),
            PostingError::InsufficientBalance { .. }
            | PostingError::UnbalancedEntry { .. }
            | PostingError::InventoryShortage { .. } => Self::BusinessRule(message),
            PostingError::NoPriorEntry(_) => Self::NotFound(message),
            PostingError::Store(_) => Self::Database(message),
        }
    }
}
