//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for branches, products, stock, and dues
//! - Repository abstractions for the three due ledgers, stock movements,
//!   and due payments
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{DueLedgerRepository, DuePaymentRepository, StockMovementRepository};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
