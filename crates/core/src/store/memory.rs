//! In-memory book with a serializable unit of work.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::contracts::{LedgerStore, LotStore};
use crate::costing::{InventoryLot, LotOrder, StoredLot};
use crate::error::StoreError;
use crate::posting::PostedLine;

/// Journal rows and lots held by a [`MemoryBook`].
#[derive(Debug, Clone, Default)]
pub struct BookState {
    /// Journal rows in posting order.
    pub lines: Vec<PostedLine>,
    /// Lots keyed by id.
    pub lots: BTreeMap<i64, InventoryLot>,
    next_lot_id: i64,
}

impl BookState {
    fn rows<'a>(
        &'a self,
        account: &'a str,
        as_of: NaiveDateTime,
    ) -> impl Iterator<Item = &'a PostedLine> + 'a {
        self.lines
            .iter()
            .filter(move |line| line.account == account && line.date <= as_of)
    }
}

/// Shared in-memory ledger and lot store.
///
/// Cloning is cheap and every clone sees the same book.
#[derive(Debug, Clone, Default)]
pub struct MemoryBook {
    state: Arc<Mutex<BookState>>,
}

impl MemoryBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a unit of work.
    ///
    /// The unit holds the book's lock until committed or dropped, so units
    /// run one after another.
    pub async fn begin(&self) -> MemoryUnit {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        MemoryUnit { guard, working }
    }

    /// Copy of the committed state.
    pub async fn snapshot(&self) -> BookState {
        self.state.lock().await.clone()
    }
}

/// A unit of work on a [`MemoryBook`].
///
/// Writes go to a private copy; [`MemoryUnit::commit`] publishes it and
/// dropping the unit discards it.
#[derive(Debug)]
pub struct MemoryUnit {
    guard: OwnedMutexGuard<BookState>,
    working: BookState,
}

impl MemoryUnit {
    /// Publishes every write of this unit.
    pub fn commit(self) {
        let Self { mut guard, working } = self;
        *guard = working;
    }

    /// State as seen inside this unit.
    #[must_use]
    pub const fn state(&self) -> &BookState {
        &self.working
    }

    fn lot_mut(&mut self, id: i64) -> Result<&mut InventoryLot, StoreError> {
        self.working
            .lots
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend(format!("Lot {id} not found")))
    }
}

impl LedgerStore for MemoryUnit {
    async fn append_lines(&mut self, lines: &[PostedLine]) -> Result<(), StoreError> {
        self.working.lines.extend_from_slice(lines);
        Ok(())
    }

    async fn max_entry_number(&mut self) -> Result<Option<i64>, StoreError> {
        Ok(self.working.lines.iter().map(|line| line.entry_number).max())
    }

    async fn net_value(&mut self, account: &str, as_of: NaiveDateTime) -> Result<Decimal, StoreError> {
        Ok(self.working.rows(account, as_of).map(|line| line.value).sum())
    }

    async fn net_quantity(
        &mut self,
        account: &str,
        as_of: NaiveDateTime,
    ) -> Result<Decimal, StoreError> {
        Ok(self.working.rows(account, as_of).map(|line| line.quantity).sum())
    }

    async fn latest_account_for_barcode(
        &mut self,
        barcode: &str,
    ) -> Result<Option<String>, StoreError> {
        Ok(self
            .working
            .lines
            .iter()
            .filter(|line| line.barcode.as_deref() == Some(barcode))
            .max_by_key(|line| (line.posted_at, line.entry_number))
            .map(|line| line.account.clone()))
    }

    async fn active_lines(
        &mut self,
        entry_number: i64,
        before: NaiveDateTime,
    ) -> Result<Vec<PostedLine>, StoreError> {
        Ok(self
            .working
            .lines
            .iter()
            .filter(|line| line.entry_number == entry_number && !line.reversed && line.date < before)
            .cloned()
            .collect())
    }

    async fn mark_reversed(&mut self, entry_number: i64) -> Result<(), StoreError> {
        for line in &mut self.working.lines {
            if line.entry_number == entry_number {
                line.reversed = true;
            }
        }
        Ok(())
    }

    async fn delete_pending(&mut self, entry_number: i64, after: NaiveDateTime) -> Result<u64, StoreError> {
        let before = self.working.lines.len();
        self.working
            .lines
            .retain(|line| !(line.entry_number == entry_number && line.date > after));
        Ok((before - self.working.lines.len()) as u64)
    }
}

impl LotStore for MemoryUnit {
    async fn insert_lot(&mut self, lot: InventoryLot) -> Result<i64, StoreError> {
        self.working.next_lot_id += 1;
        let id = self.working.next_lot_id;
        self.working.lots.insert(id, lot);
        Ok(id)
    }

    async fn open_lots(
        &mut self,
        account: &str,
        barcode: Option<&str>,
        order: LotOrder,
    ) -> Result<Vec<StoredLot>, StoreError> {
        let mut lots: Vec<StoredLot> = self
            .working
            .lots
            .iter()
            .filter(|(_, lot)| {
                lot.account == account
                    && lot.quantity > Decimal::ZERO
                    && barcode.is_none_or(|code| lot.barcode.as_deref() == Some(code))
            })
            .map(|(id, lot)| StoredLot {
                id: *id,
                lot: lot.clone(),
            })
            .collect();

        lots.sort_by_key(|stored| (stored.lot.date, stored.id));
        if order == LotOrder::Descending {
            lots.reverse();
        }
        Ok(lots)
    }

    async fn set_lot_quantity(&mut self, id: i64, quantity: Decimal) -> Result<(), StoreError> {
        self.lot_mut(id)?.quantity = quantity;
        Ok(())
    }

    async fn delete_lot(&mut self, id: i64) -> Result<(), StoreError> {
        self.working
            .lots
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::Backend(format!("Lot {id} not found")))
    }

    async fn set_account_price(&mut self, account: &str, price: Decimal) -> Result<(), StoreError> {
        for lot in self.working.lots.values_mut() {
            if lot.account == account {
                lot.price = price;
            }
        }
        Ok(())
    }

    async fn take_expired(&mut self, as_of: NaiveDateTime) -> Result<Vec<StoredLot>, StoreError> {
        let expired: Vec<i64> = self
            .working
            .lots
            .iter()
            .filter(|(_, lot)| lot.expiry < as_of)
            .map(|(id, _)| *id)
            .collect();

        let mut taken: Vec<StoredLot> = expired
            .into_iter()
            .filter_map(|id| {
                self.working
                    .lots
                    .remove(&id)
                    .map(|lot| StoredLot { id, lot })
            })
            .collect();
        taken.sort_by_key(|stored| (stored.lot.date, stored.id));
        Ok(taken)
    }
}
