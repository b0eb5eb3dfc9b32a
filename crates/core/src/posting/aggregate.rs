//! Line aggregation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::types::Line;

/// Sums value and quantity per (account, barcode).
///
/// The output is ordered by account then barcode, so any permutation of the
/// input aggregates to the same lines.
#[must_use]
pub fn aggregate(lines: &[Line]) -> Vec<Line> {
    let mut totals: BTreeMap<(&str, Option<&str>), (Decimal, Decimal)> = BTreeMap::new();

    for line in lines {
        let entry = totals
            .entry((line.account.as_str(), line.barcode.as_deref()))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += line.value;
        entry.1 += line.quantity;
    }

    totals
        .into_iter()
        .map(|((account, barcode), (value, quantity))| Line {
            account: account.to_string(),
            value,
            quantity,
            barcode: barcode.map(str::to_string),
        })
        .collect()
}
