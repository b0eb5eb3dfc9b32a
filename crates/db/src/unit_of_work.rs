//! Serializable unit of work on PostgreSQL.
//!
//! One posting runs inside one [`PgUnitOfWork`]: every read and write of the
//! ledger and the lots goes through the same `SERIALIZABLE` transaction, so a
//! concurrent posting either sees all of it or none. A serialization failure
//! surfaces as [`StoreError::Conflict`] and the caller may retry the batch.
//!
//! ```ignore
//! let mut unit = PgUnitOfWork::begin(&db).await?;
//! let outcome = PostingProcessor::new(&chart).post(&mut unit, request).await?;
//! unit.commit().await?;
//! ```

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, IsolationLevel, QueryFilter, QueryOrder, QuerySelect, RuntimeErr,
    TransactionTrait,
};
use tally_core::costing::{InventoryLot, LotOrder, StoredLot};
use tally_core::error::StoreError;
use tally_core::posting::PostedLine;
use tally_core::store::{LedgerStore, LotStore};

use crate::entities::{inventory_lots, journal_lines};

/// SQLSTATE of a serialization failure.
const SERIALIZATION_FAILURE: &str = "40001";

/// A `SERIALIZABLE` transaction implementing both store contracts.
///
/// Dropping the unit without committing rolls it back.
pub struct PgUnitOfWork {
    txn: DatabaseTransaction,
}

impl PgUnitOfWork {
    /// Begins a read-write `SERIALIZABLE` transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    pub async fn begin(db: &DatabaseConnection) -> Result<Self, StoreError> {
        let txn = db
            .begin_with_config(
                Some(IsolationLevel::Serializable),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(store_error)?;
        Ok(Self { txn })
    }

    /// Returns a reference to the underlying transaction.
    #[must_use]
    pub const fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if a concurrent unit won the race.
    pub async fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(store_error)
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), StoreError> {
        self.txn.rollback().await.map_err(store_error)
    }
}

impl std::fmt::Debug for PgUnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgUnitOfWork").finish_non_exhaustive()
    }
}

/// Maps a database error onto the store contract.
fn store_error(err: DbErr) -> StoreError {
    if is_serialization_failure(&err) {
        tracing::debug!(error = %err, "Serialization conflict");
        StoreError::Conflict
    } else {
        StoreError::Backend(err.to_string())
    }
}

fn is_serialization_failure(err: &DbErr) -> bool {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db)))
        | DbErr::Query(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db))) => {
            db.code().as_deref() == Some(SERIALIZATION_FAILURE)
        }
        _ => false,
    }
}

impl LedgerStore for PgUnitOfWork {
    async fn append_lines(&mut self, lines: &[PostedLine]) -> Result<(), StoreError> {
        if lines.is_empty() {
            return Ok(());
        }
        journal_lines::Entity::insert_many(lines.iter().map(journal_lines::active_model))
            .exec(&self.txn)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn max_entry_number(&mut self) -> Result<Option<i64>, StoreError> {
        let max: Option<Option<i64>> = journal_lines::Entity::find()
            .select_only()
            .column_as(journal_lines::Column::EntryNumber.max(), "max_entry_number")
            .into_tuple()
            .one(&self.txn)
            .await
            .map_err(store_error)?;
        Ok(max.flatten())
    }

    async fn net_value(&mut self, account: &str, as_of: NaiveDateTime) -> Result<Decimal, StoreError> {
        self.account_sum(journal_lines::Column::Value, account, as_of)
            .await
    }

    async fn net_quantity(
        &mut self,
        account: &str,
        as_of: NaiveDateTime,
    ) -> Result<Decimal, StoreError> {
        self.account_sum(journal_lines::Column::Quantity, account, as_of)
            .await
    }

    async fn latest_account_for_barcode(
        &mut self,
        barcode: &str,
    ) -> Result<Option<String>, StoreError> {
        let latest = journal_lines::Entity::find()
            .filter(journal_lines::Column::Barcode.eq(barcode))
            .order_by_desc(journal_lines::Column::PostedAt)
            .order_by_desc(journal_lines::Column::EntryNumber)
            .limit(1)
            .one(&self.txn)
            .await
            .map_err(store_error)?;
        Ok(latest.map(|row| row.account))
    }

    async fn active_lines(
        &mut self,
        entry_number: i64,
        before: NaiveDateTime,
    ) -> Result<Vec<PostedLine>, StoreError> {
        let rows = journal_lines::Entity::find()
            .filter(journal_lines::Column::EntryNumber.eq(entry_number))
            .filter(journal_lines::Column::Reversed.eq(false))
            .filter(journal_lines::Column::Date.lt(before))
            .order_by_asc(journal_lines::Column::Id)
            .all(&self.txn)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(PostedLine::from).collect())
    }

    async fn mark_reversed(&mut self, entry_number: i64) -> Result<(), StoreError> {
        journal_lines::Entity::update_many()
            .col_expr(journal_lines::Column::Reversed, Expr::value(true))
            .filter(journal_lines::Column::EntryNumber.eq(entry_number))
            .exec(&self.txn)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn delete_pending(&mut self, entry_number: i64, after: NaiveDateTime) -> Result<u64, StoreError> {
        let result = journal_lines::Entity::delete_many()
            .filter(journal_lines::Column::EntryNumber.eq(entry_number))
            .filter(journal_lines::Column::Date.gt(after))
            .exec(&self.txn)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected)
    }
}

impl PgUnitOfWork {
    /// Sum of one column over the rows of `account` dated on or before `as_of`.
    async fn account_sum(
        &self,
        column: journal_lines::Column,
        account: &str,
        as_of: NaiveDateTime,
    ) -> Result<Decimal, StoreError> {
        let sum: Option<Option<Decimal>> = journal_lines::Entity::find()
            .filter(journal_lines::Column::Account.eq(account))
            .filter(journal_lines::Column::Date.lte(as_of))
            .select_only()
            .column_as(column.sum(), "total")
            .into_tuple()
            .one(&self.txn)
            .await
            .map_err(store_error)?;
        Ok(sum.flatten().unwrap_or_default())
    }
}

impl LotStore for PgUnitOfWork {
    async fn insert_lot(&mut self, lot: InventoryLot) -> Result<i64, StoreError> {
        let inserted = inventory_lots::active_model(lot)
            .insert(&self.txn)
            .await
            .map_err(store_error)?;
        Ok(inserted.id)
    }

    async fn open_lots(
        &mut self,
        account: &str,
        barcode: Option<&str>,
        order: LotOrder,
    ) -> Result<Vec<StoredLot>, StoreError> {
        let mut query = inventory_lots::Entity::find()
            .filter(inventory_lots::Column::Account.eq(account))
            .filter(inventory_lots::Column::Quantity.gt(Decimal::ZERO));
        if let Some(barcode) = barcode {
            query = query.filter(inventory_lots::Column::Barcode.eq(barcode));
        }
        query = match order {
            LotOrder::Ascending => query
                .order_by_asc(inventory_lots::Column::Date)
                .order_by_asc(inventory_lots::Column::Id),
            LotOrder::Descending => query
                .order_by_desc(inventory_lots::Column::Date)
                .order_by_desc(inventory_lots::Column::Id),
        };

        let rows = query.all(&self.txn).await.map_err(store_error)?;
        Ok(rows.into_iter().map(StoredLot::from).collect())
    }

    async fn set_lot_quantity(&mut self, id: i64, quantity: Decimal) -> Result<(), StoreError> {
        let result = inventory_lots::Entity::update_many()
            .col_expr(inventory_lots::Column::Quantity, Expr::value(quantity))
            .filter(inventory_lots::Column::Id.eq(id))
            .exec(&self.txn)
            .await
            .map_err(store_error)?;
        if result.rows_affected == 0 {
            return Err(StoreError::Backend(format!("Lot {id} not found")));
        }
        Ok(())
    }

    async fn delete_lot(&mut self, id: i64) -> Result<(), StoreError> {
        let result = inventory_lots::Entity::delete_by_id(id)
            .exec(&self.txn)
            .await
            .map_err(store_error)?;
        if result.rows_affected == 0 {
            return Err(StoreError::Backend(format!("Lot {id} not found")));
        }
        Ok(())
    }

    async fn set_account_price(&mut self, account: &str, price: Decimal) -> Result<(), StoreError> {
        inventory_lots::Entity::update_many()
            .col_expr(inventory_lots::Column::Price, Expr::value(price))
            .filter(inventory_lots::Column::Account.eq(account))
            .exec(&self.txn)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn take_expired(&mut self, as_of: NaiveDateTime) -> Result<Vec<StoredLot>, StoreError> {
        let rows = inventory_lots::Entity::find()
            .filter(inventory_lots::Column::Expiry.is_not_null())
            .filter(inventory_lots::Column::Expiry.lt(as_of))
            .order_by_asc(inventory_lots::Column::Date)
            .order_by_asc(inventory_lots::Column::Id)
            .all(&self.txn)
            .await
            .map_err(store_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let deleted = inventory_lots::Entity::delete_many()
            .filter(inventory_lots::Column::Id.is_in(ids))
            .exec(&self.txn)
            .await
            .map_err(store_error)?;
        tracing::debug!(lots = deleted.rows_affected, %as_of, "Took expired lots");

        Ok(rows.into_iter().map(StoredLot::from).collect())
    }
}
