//! Property-based tests for line aggregation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::aggregate::aggregate;
use super::types::Line;

/// Strategy for generating lines over a small set of accounts and barcodes.
fn arb_lines() -> impl Strategy<Value = Vec<Line>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["cash", "book", "capital", "rent"]),
            prop::option::of(prop::sample::select(vec!["978", "979"])),
            -100_000i64..100_000i64,
            -50i64..50i64,
        ),
        0..20,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(account, barcode, value, quantity)| Line {
                account: account.to_string(),
                value: Decimal::new(value, 2),
                quantity: Decimal::from(quantity),
                barcode: barcode.map(str::to_string),
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Permuting the input does not change the aggregate
    #[test]
    fn prop_aggregation_is_order_independent(
        (lines, shuffled) in arb_lines().prop_flat_map(|lines| {
            let shuffled = Just(lines.clone()).prop_shuffle();
            (Just(lines), shuffled)
        })
    ) {
        prop_assert_eq!(aggregate(&lines), aggregate(&shuffled));
    }

    /// Aggregation preserves total value and quantity
    #[test]
    fn prop_aggregation_preserves_totals(lines in arb_lines()) {
        let aggregated = aggregate(&lines);

        let value: Decimal = lines.iter().map(|line| line.value).sum();
        let quantity: Decimal = lines.iter().map(|line| line.quantity).sum();
        prop_assert_eq!(aggregated.iter().map(|line| line.value).sum::<Decimal>(), value);
        prop_assert_eq!(aggregated.iter().map(|line| line.quantity).sum::<Decimal>(), quantity);
    }

    /// Every (account, barcode) pair appears once
    #[test]
    fn prop_aggregated_keys_are_unique(lines in arb_lines()) {
        let aggregated = aggregate(&lines);
        for pair in aggregated.windows(2) {
            prop_assert!(
                (&pair[0].account, &pair[0].barcode) < (&pair[1].account, &pair[1].barcode)
            );
        }
    }
}
