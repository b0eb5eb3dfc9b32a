//! PostgreSQL persistence for Tally with `SeaORM`.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for journal lines and inventory lots
//! - [`PgUnitOfWork`], a serializable transaction implementing the ledger and
//!   lot store contracts of `tally-core`
//!
//! The tables themselves are managed outside this crate.

pub mod entities;
pub mod unit_of_work;

pub use unit_of_work::PgUnitOfWork;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tally_shared::config::DatabaseConfig;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);

    tracing::debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connecting to database"
    );
    Database::connect(options).await
}
