//! Lot draws and receipts planned earlier in the same batch.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::types::{ConsumptionPlan, InventoryLot, LotOrder, StoredLot};

/// Id of the first lot received inside the batch. Store ids stay below it.
const PENDING_LOT_BASE: i64 = i64::MAX / 2;

/// Stock movements a batch has planned but not yet written.
///
/// Outflows are quoted through the reservations in the order the batch is
/// persisted, so each one sees the lots the earlier ones take and the lots
/// received before it. The quoted cost then matches what persistence consumes.
#[derive(Debug, Clone, Default)]
pub struct LotReservations {
    taken: BTreeMap<i64, Decimal>,
    pending: Vec<StoredLot>,
    next_pending: i64,
}

impl LotReservations {
    /// Creates empty reservations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lot the batch receives before its later outflows.
    pub fn receive(
        &mut self,
        account: &str,
        barcode: Option<&str>,
        price: Decimal,
        quantity: Decimal,
        date: NaiveDateTime,
    ) {
        let id = PENDING_LOT_BASE + self.next_pending;
        self.next_pending += 1;
        self.pending.push(StoredLot {
            id,
            lot: InventoryLot {
                date,
                account: account.to_string(),
                price,
                quantity,
                barcode: barcode.map(str::to_string),
                expiry: NaiveDateTime::MAX,
                name: String::new(),
                employee_name: String::new(),
                posted_at: date,
            },
        });
    }

    /// Quantity reserved from lot `id` so far.
    #[must_use]
    pub fn taken(&self, id: i64) -> Decimal {
        self.taken.get(&id).copied().unwrap_or_default()
    }

    /// Stored lots plus pending receipts of `account`, net of earlier draws,
    /// in visiting order.
    ///
    /// A `None` barcode matches every lot of the account, as the store does.
    pub(crate) fn available(
        &self,
        mut lots: Vec<StoredLot>,
        account: &str,
        barcode: Option<&str>,
        order: LotOrder,
    ) -> Vec<StoredLot> {
        lots.extend(
            self.pending
                .iter()
                .filter(|stored| {
                    stored.lot.account == account
                        && barcode.is_none_or(|code| stored.lot.barcode.as_deref() == Some(code))
                })
                .cloned(),
        );
        for stored in &mut lots {
            stored.lot.quantity -= self.taken(stored.id);
        }
        lots.retain(|stored| stored.lot.quantity > Decimal::ZERO);

        lots.sort_by_key(|stored| (stored.lot.date, stored.id));
        if order == LotOrder::Descending {
            lots.reverse();
        }
        lots
    }

    /// Marks the draws of `plan` as taken.
    pub(crate) fn record(&mut self, plan: &ConsumptionPlan) {
        for draw in &plan.draws {
            *self.taken.entry(draw.lot_id).or_default() += draw.taken;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::plan_consumption;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn stored(id: i64, day: u32, price: Decimal, barcode: Option<&str>) -> StoredLot {
        StoredLot {
            id,
            lot: InventoryLot {
                date: at(day),
                account: "book".into(),
                price,
                quantity: dec!(5),
                barcode: barcode.map(str::to_string),
                expiry: NaiveDateTime::MAX,
                name: "clerk".into(),
                employee_name: "clerk".into(),
                posted_at: at(day),
            },
        }
    }

    #[test]
    fn test_earlier_draws_are_deducted() {
        let lots = vec![stored(1, 1, dec!(10), Some("x")), stored(2, 2, dec!(12), None)];
        let mut reservations = LotReservations::new();

        let first = reservations.available(lots.clone(), "book", None, LotOrder::Ascending);
        let plan = plan_consumption(&first, dec!(-7)).unwrap();
        assert_eq!(plan.cost, dec!(74));
        reservations.record(&plan);

        let second = reservations.available(lots, "book", None, LotOrder::Ascending);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, 2);
        assert_eq!(second[0].lot.quantity, dec!(3));
        assert_eq!(reservations.taken(1), dec!(5));
    }

    #[test]
    fn test_pending_receipts_are_visited_last_on_their_date() {
        let mut reservations = LotReservations::new();
        reservations.receive("book", Some("x"), dec!(9), dec!(2), at(1));
        reservations.receive("pen", None, dec!(1), dec!(2), at(1));

        let lots = reservations.available(
            vec![stored(1, 1, dec!(10), Some("x"))],
            "book",
            Some("x"),
            LotOrder::Ascending,
        );
        let prices: Vec<Decimal> = lots.iter().map(|stored| stored.lot.price).collect();
        assert_eq!(prices, vec![dec!(10), dec!(9)]);

        let newest_first = reservations.available(
            vec![stored(1, 1, dec!(10), Some("x"))],
            "book",
            None,
            LotOrder::Descending,
        );
        assert_eq!(newest_first[0].lot.price, dec!(9));
    }
}
