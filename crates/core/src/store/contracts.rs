//! Store contracts consumed by the posting processor and the costing engine.
//!
//! Both are implemented by the db crate on a serializable transaction and by
//! [`super::MemoryUnit`] in memory. Every call happens inside one unit of
//! work, so implementations take `&mut self`.

use std::future::Future;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::costing::{InventoryLot, LotOrder, StoredLot};
use crate::error::StoreError;
use crate::posting::PostedLine;

/// Journal persistence.
pub trait LedgerStore: Send {
    /// Appends lines in order.
    fn append_lines(
        &mut self,
        lines: &[PostedLine],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Highest entry number used so far, `None` on an empty ledger.
    fn max_entry_number(&mut self) -> impl Future<Output = Result<Option<i64>, StoreError>> + Send;

    /// Sum of the values of every row of `account` dated on or before `as_of`.
    fn net_value(
        &mut self,
        account: &str,
        as_of: NaiveDateTime,
    ) -> impl Future<Output = Result<Decimal, StoreError>> + Send;

    /// Sum of the quantities of every row of `account` dated on or before `as_of`.
    fn net_quantity(
        &mut self,
        account: &str,
        as_of: NaiveDateTime,
    ) -> impl Future<Output = Result<Decimal, StoreError>> + Send;

    /// Account of the most recently posted row carrying `barcode`.
    fn latest_account_for_barcode(
        &mut self,
        barcode: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Rows of an entry not yet reversed and dated strictly before `before`.
    fn active_lines(
        &mut self,
        entry_number: i64,
        before: NaiveDateTime,
    ) -> impl Future<Output = Result<Vec<PostedLine>, StoreError>> + Send;

    /// Flags every row of an entry as reversed.
    fn mark_reversed(
        &mut self,
        entry_number: i64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes the rows of an entry dated strictly after `after`, returning how many went.
    fn delete_pending(
        &mut self,
        entry_number: i64,
        after: NaiveDateTime,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// Inventory lot persistence.
pub trait LotStore: Send {
    /// Stores a lot and returns its id.
    fn insert_lot(
        &mut self,
        lot: InventoryLot,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Lots of `account` with a positive quantity, by receipt date then id.
    ///
    /// A `None` barcode matches every lot of the account.
    fn open_lots(
        &mut self,
        account: &str,
        barcode: Option<&str>,
        order: LotOrder,
    ) -> impl Future<Output = Result<Vec<StoredLot>, StoreError>> + Send;

    /// Overwrites the remaining quantity of a lot.
    fn set_lot_quantity(
        &mut self,
        id: i64,
        quantity: Decimal,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes a lot.
    fn delete_lot(&mut self, id: i64) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Sets the unit cost of every lot of an account.
    fn set_account_price(
        &mut self,
        account: &str,
        price: Decimal,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes and returns every lot whose expiry is strictly before `as_of`.
    fn take_expired(
        &mut self,
        as_of: NaiveDateTime,
    ) -> impl Future<Output = Result<Vec<StoredLot>, StoreError>> + Send;
}
