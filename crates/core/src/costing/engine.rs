//! Inventory costing engine.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::plan::plan_consumption;
use super::reservations::LotReservations;
use super::types::{ConsumptionPlan, InventoryLot, LotOrder, Shortfall};
use crate::chart::names;
use crate::error::PostingError;
use crate::posting::Line;
use crate::store::{LedgerStore, LotStore};

/// Costing engine over a lot store.
///
/// Stateless; every operation runs inside the caller's unit of work.
pub struct CostingEngine;

impl CostingEngine {
    /// Stores a received lot.
    pub async fn receive<S: LotStore>(store: &mut S, lot: InventoryLot) -> Result<i64, PostingError> {
        tracing::debug!(
            account = %lot.account,
            quantity = %lot.quantity,
            price = %lot.price,
            "Receiving lot"
        );
        Ok(store.insert_lot(lot).await?)
    }

    /// Cost of taking `quantity` units, without touching the lots.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::InventoryShortage` if the lots hold too little.
    pub async fn quote<S: LotStore>(
        store: &mut S,
        account: &str,
        barcode: Option<&str>,
        quantity: Decimal,
        order: LotOrder,
    ) -> Result<Decimal, PostingError> {
        let lots = store.open_lots(account, barcode, order).await?;
        plan_consumption(&lots, quantity)
            .map(|plan| plan.cost)
            .map_err(|shortfall| Self::shortage(account, barcode, shortfall))
    }

    /// Quotes an outflow against what earlier outflows of the batch left
    /// and reserves the lots it takes.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::InventoryShortage` if the remaining lots hold too little.
    pub async fn reserve<S: LotStore>(
        store: &mut S,
        reservations: &mut LotReservations,
        account: &str,
        barcode: Option<&str>,
        quantity: Decimal,
        order: LotOrder,
    ) -> Result<Decimal, PostingError> {
        let lots = store.open_lots(account, barcode, order).await?;
        let lots = reservations.available(lots, account, barcode, order);
        let plan = plan_consumption(&lots, quantity)
            .map_err(|shortfall| Self::shortage(account, barcode, shortfall))?;
        reservations.record(&plan);
        Ok(plan.cost)
    }

    /// Takes `quantity` units out of the lots.
    ///
    /// The whole plan is computed before the first write, so a shortage
    /// leaves every lot untouched. Emptied lots are deleted.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::InventoryShortage` if the lots hold too little.
    pub async fn consume<S: LotStore>(
        store: &mut S,
        account: &str,
        barcode: Option<&str>,
        quantity: Decimal,
        order: LotOrder,
    ) -> Result<ConsumptionPlan, PostingError> {
        let lots = store.open_lots(account, barcode, order).await?;
        let plan = plan_consumption(&lots, quantity)
            .map_err(|shortfall| Self::shortage(account, barcode, shortfall))?;

        for draw in &plan.draws {
            if draw.empties_lot() {
                store.delete_lot(draw.lot_id).await?;
            } else {
                store.set_lot_quantity(draw.lot_id, draw.remaining).await?;
            }
        }

        tracing::debug!(
            account,
            quantity = %quantity.abs(),
            cost = %plan.cost,
            lots = plan.draws.len(),
            "Consumed lots"
        );
        Ok(plan)
    }

    /// Resets the lot price of weighted-average accounts to the ledger's
    /// net value over net quantity. Accounts with no net quantity are left alone.
    pub async fn reprice<S: LedgerStore + LotStore>(
        store: &mut S,
        accounts: &[String],
        as_of: NaiveDateTime,
    ) -> Result<(), PostingError> {
        for account in accounts {
            let quantity = store.net_quantity(account, as_of).await?;
            if quantity.is_zero() {
                continue;
            }
            let price = store.net_value(account, as_of).await? / quantity;
            store.set_account_price(account, price).await?;
            tracing::debug!(account = %account, price = %price, "Repriced weighted-average lots");
        }
        Ok(())
    }

    /// Removes every lot that expired before `as_of` and returns the lines
    /// writing it off: one per lot plus the `expair_expenses` counterpart.
    ///
    /// Returns no lines when nothing expired.
    pub async fn expire_lots<S: LotStore>(
        store: &mut S,
        as_of: NaiveDateTime,
    ) -> Result<Vec<Line>, PostingError> {
        let expired = store.take_expired(as_of).await?;

        let mut lines: Vec<Line> = expired
            .iter()
            .filter(|stored| !stored.lot.quantity.is_zero())
            .map(|stored| Line {
                account: stored.lot.account.clone(),
                value: -stored.lot.value(),
                quantity: -stored.lot.quantity,
                barcode: stored.lot.barcode.clone(),
            })
            .collect();

        if lines.is_empty() {
            return Ok(lines);
        }

        let value: Decimal = lines.iter().map(|line| line.value).sum();
        let quantity: Decimal = lines.iter().map(|line| line.quantity).sum();
        lines.push(Line::new(names::EXPIRY_EXPENSES, -value, -quantity));

        let written_off = -value;
        tracing::info!(lots = expired.len(), value = %written_off, "Expired inventory lots");
        Ok(lines)
    }

    fn shortage(account: &str, barcode: Option<&str>, shortfall: Shortfall) -> PostingError {
        PostingError::InventoryShortage {
            account: account.to_string(),
            barcode: barcode.map(str::to_string),
            requested: shortfall.requested,
            shortfall: shortfall.missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBook;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn lot(day: u32, price: Decimal, quantity: Decimal, expiry_day: u32) -> InventoryLot {
        InventoryLot {
            date: at(day),
            account: "book".into(),
            price,
            quantity,
            barcode: None,
            expiry: at(expiry_day),
            name: "clerk".into(),
            employee_name: "clerk".into(),
            posted_at: at(day),
        }
    }

    async fn stocked() -> MemoryBook {
        let book = MemoryBook::new();
        let mut unit = book.begin().await;
        CostingEngine::receive(&mut unit, lot(1, dec!(10), dec!(5), 30))
            .await
            .unwrap();
        CostingEngine::receive(&mut unit, lot(2, dec!(12), dec!(5), 30))
            .await
            .unwrap();
        unit.commit();
        book
    }

    fn remaining(unit: &crate::store::MemoryUnit) -> Vec<(Decimal, Decimal)> {
        unit.state()
            .lots
            .values()
            .map(|lot| (lot.price, lot.quantity))
            .collect()
    }

    #[tokio::test]
    async fn test_fifo_consumption() {
        let book = stocked().await;
        let mut unit = book.begin().await;

        let plan = CostingEngine::consume(&mut unit, "book", None, dec!(-7), LotOrder::Ascending)
            .await
            .unwrap();

        assert_eq!(plan.cost, dec!(74));
        assert_eq!(remaining(&unit), vec![(dec!(12), dec!(3))]);
    }

    #[tokio::test]
    async fn test_lifo_consumption() {
        let book = stocked().await;
        let mut unit = book.begin().await;

        let plan = CostingEngine::consume(&mut unit, "book", None, dec!(7), LotOrder::Descending)
            .await
            .unwrap();

        assert_eq!(plan.cost, dec!(80));
        assert_eq!(remaining(&unit), vec![(dec!(10), dec!(3))]);
    }

    #[tokio::test]
    async fn test_quote_does_not_mutate() {
        let book = stocked().await;
        let mut unit = book.begin().await;

        let cost = CostingEngine::quote(&mut unit, "book", None, dec!(7), LotOrder::Ascending)
            .await
            .unwrap();

        assert_eq!(cost, dec!(74));
        assert_eq!(remaining(&unit), vec![(dec!(10), dec!(5)), (dec!(12), dec!(5))]);
    }

    #[tokio::test]
    async fn test_reserved_lots_are_not_quoted_twice() {
        let book = stocked().await;
        let mut unit = book.begin().await;
        let mut reservations = LotReservations::new();

        let first = CostingEngine::reserve(
            &mut unit,
            &mut reservations,
            "book",
            None,
            dec!(-5),
            LotOrder::Ascending,
        )
        .await
        .unwrap();
        let second = CostingEngine::reserve(
            &mut unit,
            &mut reservations,
            "book",
            None,
            dec!(-5),
            LotOrder::Ascending,
        )
        .await
        .unwrap();

        assert_eq!((first, second), (dec!(50), dec!(60)));
        assert!(matches!(
            CostingEngine::reserve(
                &mut unit,
                &mut reservations,
                "book",
                None,
                dec!(-1),
                LotOrder::Ascending,
            )
            .await,
            Err(PostingError::InventoryShortage { .. })
        ));
        assert_eq!(remaining(&unit), vec![(dec!(10), dec!(5)), (dec!(12), dec!(5))]);
    }

    #[tokio::test]
    async fn test_shortage_mutates_nothing() {
        let book = stocked().await;
        let mut unit = book.begin().await;

        let err = CostingEngine::consume(&mut unit, "book", None, dec!(12), LotOrder::Ascending)
            .await
            .unwrap_err();

        match err {
            PostingError::InventoryShortage {
                account,
                requested,
                shortfall,
                ..
            } => {
                assert_eq!(account, "book");
                assert_eq!(requested, dec!(12));
                assert_eq!(shortfall, dec!(2));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(remaining(&unit), vec![(dec!(10), dec!(5)), (dec!(12), dec!(5))]);
    }

    #[tokio::test]
    async fn test_expire_lots() {
        let book = MemoryBook::new();
        let mut unit = book.begin().await;
        CostingEngine::receive(&mut unit, lot(1, dec!(10), dec!(5), 3))
            .await
            .unwrap();
        CostingEngine::receive(&mut unit, lot(1, dec!(4), dec!(2), 4))
            .await
            .unwrap();
        CostingEngine::receive(&mut unit, lot(2, dec!(12), dec!(5), 30))
            .await
            .unwrap();

        let lines = CostingEngine::expire_lots(&mut unit, at(10)).await.unwrap();

        assert_eq!(
            lines,
            vec![
                Line::new("book", dec!(-50), dec!(-5)),
                Line::new("book", dec!(-8), dec!(-2)),
                Line::new("expair_expenses", dec!(58), dec!(7)),
            ]
        );
        assert_eq!(remaining(&unit), vec![(dec!(12), dec!(5))]);
    }

    #[tokio::test]
    async fn test_expire_nothing() {
        let book = stocked().await;
        let mut unit = book.begin().await;
        assert!(CostingEngine::expire_lots(&mut unit, at(10)).await.unwrap().is_empty());
    }
}
