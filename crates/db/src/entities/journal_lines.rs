//! `SeaORM` Entity for journal_lines table.

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::posting::PostedLine;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub date: DateTime,
    pub entry_number: i64,
    pub account: String,
    pub value: Decimal,
    pub price: Decimal,
    pub quantity: Decimal,
    pub barcode: Option<String>,
    pub expiry: DateTime,
    pub description: String,
    pub name: String,
    pub employee_name: String,
    pub posted_at: DateTime,
    pub reversed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PostedLine {
    fn from(model: Model) -> Self {
        Self {
            date: model.date,
            entry_number: model.entry_number,
            account: model.account,
            value: model.value,
            price: model.price,
            quantity: model.quantity,
            barcode: model.barcode,
            expiry: model.expiry,
            description: model.description,
            name: model.name,
            employee_name: model.employee_name,
            posted_at: model.posted_at,
            reversed: model.reversed,
        }
    }
}

/// Insertable row for a posted line; the id is assigned by the database.
#[must_use]
pub fn active_model(line: &PostedLine) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        date: Set(line.date),
        entry_number: Set(line.entry_number),
        account: Set(line.account.clone()),
        value: Set(line.value),
        price: Set(line.price),
        quantity: Set(line.quantity),
        barcode: Set(line.barcode.clone()),
        expiry: Set(line.expiry),
        description: Set(line.description.clone()),
        name: Set(line.name.clone()),
        employee_name: Set(line.employee_name.clone()),
        posted_at: Set(line.posted_at),
        reversed: Set(line.reversed),
    }
}
