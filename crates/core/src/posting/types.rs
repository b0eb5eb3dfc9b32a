//! Domain types for posting batches.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::{Curve, WindowSpec};

/// A raw account movement.
///
/// Value and quantity share sign; an empty account is resolved through the barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Account name, empty when the barcode identifies the account.
    #[serde(default)]
    pub account: String,
    /// Signed value.
    pub value: Decimal,
    /// Signed quantity.
    pub quantity: Decimal,
    /// Barcode of the item moved, if any.
    #[serde(default)]
    pub barcode: Option<String>,
}

impl Line {
    /// Creates a line without barcode.
    #[must_use]
    pub fn new(account: impl Into<String>, value: Decimal, quantity: Decimal) -> Self {
        Self {
            account: account.into(),
            value,
            quantity,
            barcode: None,
        }
    }

    /// Attaches a barcode.
    #[must_use]
    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    /// Returns true if value or quantity is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value.is_zero() || self.quantity.is_zero()
    }

    /// Unit price, zero when the quantity is zero.
    #[must_use]
    pub fn price(&self) -> Decimal {
        if self.quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.value / self.quantity
        }
    }

    /// The same movement in the opposite direction.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            account: self.account.clone(),
            value: -self.value,
            quantity: -self.quantity,
            barcode: self.barcode.clone(),
        }
    }
}

/// Adjusting method of a posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustingMethod {
    /// Post as is.
    #[default]
    None,
    /// Spread evenly over the calendar.
    Linear,
    /// Spread with growing slices.
    Exponential,
    /// Spread with shrinking slices.
    Logarithmic,
    /// Inventory received with an expiry date.
    Expire,
}

impl AdjustingMethod {
    /// Every method except `None` needs an expiry date.
    #[must_use]
    pub const fn requires_expiry(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Allocation curve of the method, if it spreads values.
    #[must_use]
    pub const fn curve(self) -> Option<Curve> {
        match self {
            Self::Linear => Some(Curve::Linear),
            Self::Exponential => Some(Curve::Exponential),
            Self::Logarithmic => Some(Curve::Logarithmic),
            Self::None | Self::Expire => None,
        }
    }

    /// Inventory accounts cannot be spread over time.
    #[must_use]
    pub const fn allowed_for_inventory(self) -> bool {
        matches!(self, Self::None | Self::Expire)
    }
}

impl std::fmt::Display for AdjustingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Linear => write!(f, "linear"),
            Self::Exponential => write!(f, "exponential"),
            Self::Logarithmic => write!(f, "logarithmic"),
            Self::Expire => write!(f, "expire"),
        }
    }
}

/// A batch of lines to post as one entry.
#[derive(Debug, Clone)]
pub struct PostingRequest {
    /// Raw lines.
    pub lines: Vec<Line>,
    /// Entry number to reverse before posting.
    pub correction_of: Option<i64>,
    /// Posting date, defaults to `now`.
    pub date: Option<NaiveDateTime>,
    /// Expiry date, required iff the adjusting method needs one.
    pub expiry: Option<NaiveDateTime>,
    /// Adjusting method.
    pub adjusting_method: AdjustingMethod,
    /// Expand sales and services into itemized lines.
    pub auto_complete: bool,
    /// Entry description.
    pub description: String,
    /// Author of the entry.
    pub author: String,
    /// Employee responsible for the entry.
    pub employee: String,
    /// Business calendar for adjusting methods, all day every day when absent.
    pub calendar: Option<Vec<WindowSpec>>,
    /// Clock reading for this posting.
    pub now: NaiveDateTime,
}

impl PostingRequest {
    /// Creates a plain request: no correction, no adjusting method, no auto-completion.
    #[must_use]
    pub fn new(lines: Vec<Line>, now: NaiveDateTime) -> Self {
        Self {
            lines,
            correction_of: None,
            date: None,
            expiry: None,
            adjusting_method: AdjustingMethod::None,
            auto_complete: false,
            description: String::new(),
            author: String::new(),
            employee: String::new(),
            calendar: None,
            now,
        }
    }
}

/// A persisted journal line.
///
/// Field order follows the stored row layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedLine {
    /// Effective date.
    pub date: NaiveDateTime,
    /// Entry number.
    pub entry_number: i64,
    /// Account name.
    pub account: String,
    /// Signed value.
    pub value: Decimal,
    /// Unit price.
    pub price: Decimal,
    /// Signed quantity.
    pub quantity: Decimal,
    /// Barcode, if any.
    pub barcode: Option<String>,
    /// Expiry date.
    pub expiry: NaiveDateTime,
    /// Entry description.
    pub description: String,
    /// Author.
    pub name: String,
    /// Responsible employee.
    pub employee_name: String,
    /// When the entry was posted.
    pub posted_at: NaiveDateTime,
    /// Set once a correcting entry reversed this line.
    pub reversed: bool,
}

impl PostedLine {
    /// The raw movement of this row.
    #[must_use]
    pub fn line(&self) -> Line {
        Line {
            account: self.account.clone(),
            value: self.value,
            quantity: self.quantity,
            barcode: self.barcode.clone(),
        }
    }
}

/// Header shared by every line of one entry.
#[derive(Debug, Clone)]
pub struct EntryHeader {
    /// Entry number.
    pub entry_number: i64,
    /// Effective date.
    pub date: NaiveDateTime,
    /// Expiry date.
    pub expiry: NaiveDateTime,
    /// Description.
    pub description: String,
    /// Author.
    pub name: String,
    /// Responsible employee.
    pub employee_name: String,
    /// Posting timestamp.
    pub posted_at: NaiveDateTime,
}

impl EntryHeader {
    /// Stamps a line with this header.
    #[must_use]
    pub fn stamp(&self, line: Line) -> PostedLine {
        PostedLine {
            date: self.date,
            entry_number: self.entry_number,
            price: line.price(),
            account: line.account,
            value: line.value,
            quantity: line.quantity,
            barcode: line.barcode,
            expiry: self.expiry,
            description: self.description.clone(),
            name: self.name.clone(),
            employee_name: self.employee_name.clone(),
            posted_at: self.posted_at,
            reversed: false,
        }
    }
}

/// Per-account invoice row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Item, service or settlement account.
    pub account: String,
    /// Quantity sold.
    pub quantity: Decimal,
    /// Unit price before discount.
    pub price: Decimal,
    /// Value before discount.
    pub gross: Decimal,
    /// Discount amount.
    pub discount: Decimal,
    /// Value after discount.
    pub net: Decimal,
}

/// Result of a successful posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingOutcome {
    /// Every persisted line, reversal lines first.
    pub lines: Vec<PostedLine>,
    /// Invoice view of the entry.
    pub invoice: Vec<InvoiceLine>,
    /// Posting timestamp.
    pub posted_at: NaiveDateTime,
    /// Number of the entry posted, or of the reversal when the batch itself
    /// had no lines left. `None` when nothing was written.
    pub entry_number: Option<i64>,
}
