//! Property-based tests for allocation curves.

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calendar::BusinessCalendar;
use super::curve::{AllocationEngine, Curve};
use crate::posting::Line;

fn day(offset: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 2, 1 + offset)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .unwrap_or_default()
}

/// Strategy for generating positive amounts with two decimals.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (100i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_curve() -> impl Strategy<Value = Curve> {
    prop_oneof![
        Just(Curve::Linear),
        Just(Curve::Exponential),
        Just(Curve::Logarithmic),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Slices add back up to the spread value
    #[test]
    fn prop_slices_sum_to_total(
        total in arb_amount(),
        curve in arb_curve(),
        days in 0u32..20u32,
    ) {
        let instances = BusinessCalendar::default().instances(day(0), day(days)).unwrap();
        let slices = AllocationEngine::slices(curve, total, &instances).unwrap();

        prop_assert_eq!(slices.len(), instances.len());
        prop_assert_eq!(slices.iter().copied().sum::<Decimal>(), total);
    }

    /// Spread lines add back up to the original value and quantity
    #[test]
    fn prop_spread_preserves_value_and_quantity(
        total in arb_amount(),
        quantity in 1i64..100i64,
        negative in any::<bool>(),
        curve in arb_curve(),
        days in 0u32..10u32,
    ) {
        let (value, quantity) = if negative {
            (-total, -Decimal::from(quantity))
        } else {
            (total, Decimal::from(quantity))
        };
        let line = Line::new("prepaid insurance", value, quantity);
        let instances = BusinessCalendar::default().instances(day(0), day(days)).unwrap();
        let spread = AllocationEngine::spread(&line, curve, &instances).unwrap();

        prop_assert_eq!(spread.iter().map(|s| s.line.value).sum::<Decimal>(), value);
        prop_assert_eq!(spread.iter().map(|s| s.line.quantity).sum::<Decimal>(), quantity);
    }
}

mod unit_tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_single_day_takes_everything() {
        let instances = BusinessCalendar::default().instances(day(0), day(0)).unwrap();
        for curve in [Curve::Linear, Curve::Exponential, Curve::Logarithmic] {
            let slices = AllocationEngine::slices(curve, dec!(42.5), &instances).unwrap();
            assert_eq!(slices, vec![dec!(42.5)]);
        }
    }

    #[test]
    fn test_value_of_one_is_spread_without_logarithm() {
        let instances = BusinessCalendar::default().instances(day(0), day(2)).unwrap();
        let slices = AllocationEngine::slices(Curve::Exponential, Decimal::ONE, &instances).unwrap();
        assert_eq!(slices.iter().copied().sum::<Decimal>(), Decimal::ONE);
    }
}
