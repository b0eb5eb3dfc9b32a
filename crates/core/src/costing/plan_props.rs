//! Property-based tests for consumption planning.

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::plan::plan_consumption;
use super::types::{InventoryLot, StoredLot};

fn received(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Strategy for generating lots with positive price and quantity.
fn arb_lots() -> impl Strategy<Value = Vec<StoredLot>> {
    prop::collection::vec((1i64..10_000i64, 1i64..500i64), 1..8).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (price, quantity))| {
                let id = i64::try_from(index).unwrap_or_default() + 1;
                let day = u32::try_from(index).unwrap_or_default() + 1;
                StoredLot {
                    id,
                    lot: InventoryLot {
                        date: received(day),
                        account: "stock".to_string(),
                        price: Decimal::new(price, 2),
                        quantity: Decimal::from(quantity),
                        barcode: None,
                        expiry: received(28),
                        name: "clerk".to_string(),
                        employee_name: "clerk".to_string(),
                        posted_at: received(day),
                    },
                }
            })
            .collect()
    })
}

fn on_hand(lots: &[StoredLot]) -> Decimal {
    lots.iter().map(|stored| stored.lot.quantity).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Draws cover exactly the requested quantity
    #[test]
    fn prop_draws_cover_request(lots in arb_lots(), fraction in 0u32..=100u32) {
        let quantity = (on_hand(&lots) * Decimal::from(fraction) / Decimal::from(100)).floor();
        let plan = plan_consumption(&lots, quantity).unwrap();

        let taken: Decimal = plan.draws.iter().map(|draw| draw.taken).sum();
        prop_assert_eq!(taken, quantity);
    }

    /// Cost is the sum of taken quantity times lot price
    #[test]
    fn prop_cost_matches_draws(lots in arb_lots(), fraction in 0u32..=100u32) {
        let quantity = (on_hand(&lots) * Decimal::from(fraction) / Decimal::from(100)).floor();
        let plan = plan_consumption(&lots, quantity).unwrap();

        let cost: Decimal = plan.draws.iter().map(|draw| draw.taken * draw.price).sum();
        prop_assert_eq!(plan.cost, cost);
    }

    /// Only the last draw may leave stock in its lot
    #[test]
    fn prop_earlier_lots_are_emptied(lots in arb_lots(), fraction in 0u32..=100u32) {
        let quantity = (on_hand(&lots) * Decimal::from(fraction) / Decimal::from(100)).floor();
        let plan = plan_consumption(&lots, quantity).unwrap();

        if let Some((_, earlier)) = plan.draws.split_last() {
            for draw in earlier {
                prop_assert!(draw.empties_lot());
            }
        }
    }

    /// Asking for more than is on hand reports the exact shortfall
    #[test]
    fn prop_over_consumption_reports_shortfall(lots in arb_lots(), extra in 1i64..100i64) {
        let quantity = on_hand(&lots) + Decimal::from(extra);
        let shortfall = plan_consumption(&lots, -quantity).unwrap_err();

        prop_assert_eq!(shortfall.requested, quantity);
        prop_assert_eq!(shortfall.missing, Decimal::from(extra));
    }
}

mod unit_tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lot(id: i64, price: Decimal, quantity: Decimal) -> StoredLot {
        StoredLot {
            id,
            lot: InventoryLot {
                date: received(u32::try_from(id).unwrap()),
                account: "stock".to_string(),
                price,
                quantity,
                barcode: None,
                expiry: received(28),
                name: "clerk".to_string(),
                employee_name: "clerk".to_string(),
                posted_at: received(1),
            },
        }
    }

    #[test]
    fn test_fifo_plan() {
        let lots = vec![lot(1, dec!(10), dec!(5)), lot(2, dec!(12), dec!(5))];
        let plan = plan_consumption(&lots, dec!(7)).unwrap();

        assert_eq!(plan.cost, dec!(74));
        assert_eq!(plan.draws.len(), 2);
        assert!(plan.draws[0].empties_lot());
        assert_eq!(plan.draws[1].remaining, dec!(3));
    }

    #[test]
    fn test_lifo_plan() {
        let lots = vec![lot(2, dec!(12), dec!(5)), lot(1, dec!(10), dec!(5))];
        let plan = plan_consumption(&lots, dec!(7)).unwrap();

        assert_eq!(plan.cost, dec!(80));
        assert_eq!(plan.draws[1].lot_id, 1);
        assert_eq!(plan.draws[1].remaining, dec!(3));
    }

    #[test]
    fn test_zero_request_is_free() {
        let lots = vec![lot(1, dec!(10), dec!(5))];
        let plan = plan_consumption(&lots, Decimal::ZERO).unwrap();
        assert!(plan.draws.is_empty());
        assert_eq!(plan.cost, Decimal::ZERO);
    }

    #[test]
    fn test_empty_lots_short() {
        let shortfall = plan_consumption(&[], dec!(2)).unwrap_err();
        assert_eq!(shortfall.missing, dec!(2));
    }
}
