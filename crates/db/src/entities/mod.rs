//! `SeaORM` entities.

pub mod inventory_lots;
pub mod journal_lines;
