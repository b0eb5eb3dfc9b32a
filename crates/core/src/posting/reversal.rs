//! Reversing entries for corrections.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::types::{Line, PostedLine};

/// A reversal waiting to be persisted ahead of its correcting entry.
#[derive(Debug, Clone)]
pub struct PendingReversal {
    /// Entry being reversed.
    pub target: i64,
    /// Exact negations of the target's active lines.
    pub lines: Vec<Line>,
    /// Description of the reversing entry.
    pub description: String,
}

impl PendingReversal {
    /// Value the reversal adds to each account.
    #[must_use]
    pub fn deltas(&self) -> BTreeMap<&str, Decimal> {
        let mut deltas = BTreeMap::new();
        for line in &self.lines {
            *deltas.entry(line.account.as_str()).or_insert(Decimal::ZERO) += line.value;
        }
        deltas
    }
}

/// Stateless service for reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Builds the reversal of `target` from its active lines.
    ///
    /// Returns `None` when there is nothing left to reverse.
    #[must_use]
    pub fn reverse(target: i64, active: &[PostedLine], reviewer: &str) -> Option<PendingReversal> {
        let first = active.first()?;
        Some(PendingReversal {
            target,
            lines: active.iter().map(|posted| posted.line().negated()).collect(),
            description: Self::description(target, &first.employee_name, reviewer),
        })
    }

    /// Description naming the reversed entry, its employee and the reviewer.
    #[must_use]
    pub fn description(target: i64, employee: &str, reviewer: &str) -> String {
        format!("Reversal of entry {target} by {employee}, reviewed by {reviewer}")
    }
}
