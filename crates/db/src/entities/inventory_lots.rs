//! `SeaORM` Entity for inventory_lots table.
//!
//! A lot that never expires is stored with a NULL expiry.

use chrono::NaiveDateTime;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::costing::{InventoryLot, StoredLot};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_lots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub date: DateTime,
    pub account: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub barcode: Option<String>,
    pub expiry: Option<DateTime>,
    pub name: String,
    pub employee_name: String,
    pub posted_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StoredLot {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            lot: InventoryLot {
                date: model.date,
                account: model.account,
                price: model.price,
                quantity: model.quantity,
                barcode: model.barcode,
                expiry: model.expiry.unwrap_or(NaiveDateTime::MAX),
                name: model.name,
                employee_name: model.employee_name,
                posted_at: model.posted_at,
            },
        }
    }
}

/// Insertable row for a received lot.
#[must_use]
pub fn active_model(lot: InventoryLot) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        date: Set(lot.date),
        account: Set(lot.account),
        price: Set(lot.price),
        quantity: Set(lot.quantity),
        barcode: Set(lot.barcode),
        expiry: Set((lot.expiry != NaiveDateTime::MAX).then_some(lot.expiry)),
        name: Set(lot.name),
        employee_name: Set(lot.employee_name),
        posted_at: Set(lot.posted_at),
    }
}
