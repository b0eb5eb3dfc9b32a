//! Batch file format.

use chrono::NaiveDateTime;
use serde::Deserialize;
use tally_core::allocation::WindowSpec;
use tally_core::posting::{AdjustingMethod, Line, PostingRequest};

/// A posting batch as read from JSON.
///
/// Everything but the lines is optional; `now` is supplied at posting time.
#[derive(Debug, Clone, Deserialize)]
pub struct Batch {
    /// Account movements.
    pub lines: Vec<Line>,
    /// Entry number to reverse before posting.
    #[serde(default)]
    pub correction_of: Option<i64>,
    /// Posting date.
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    /// Expiry date, required by every adjusting method.
    #[serde(default)]
    pub expiry: Option<NaiveDateTime>,
    /// Adjusting method.
    #[serde(default)]
    pub adjusting_method: AdjustingMethod,
    /// Expand sales and services.
    #[serde(default)]
    pub auto_complete: bool,
    /// Entry description.
    #[serde(default)]
    pub description: String,
    /// Author of the entry.
    pub author: String,
    /// Responsible employee.
    #[serde(default)]
    pub employee: String,
    /// Business calendar for adjusting methods.
    #[serde(default)]
    pub calendar: Option<Vec<WindowSpec>>,
}

impl Batch {
    /// Turns the batch into a request posted at `now`.
    #[must_use]
    pub fn into_request(self, now: NaiveDateTime) -> PostingRequest {
        PostingRequest {
            correction_of: self.correction_of,
            date: self.date,
            expiry: self.expiry,
            adjusting_method: self.adjusting_method,
            auto_complete: self.auto_complete,
            description: self.description,
            author: self.author,
            employee: self.employee,
            calendar: self.calendar,
            ..PostingRequest::new(self.lines, now)
        }
    }
}
