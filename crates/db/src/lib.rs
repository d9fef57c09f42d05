//! Database layer with `SeaORM` entities, repositories and batch jobs.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//! - The scheduled batch jobs (pricing, cashflow, invoicing)

pub mod entities;
pub mod jobs;
pub mod migration;
pub mod repositories;

pub use repositories::{
    BankAccountRepository, BookingRepository, CashflowRepository, FinanceEventRepository,
    FlagRepository, InvoiceRepository, PricingRepository, RuleRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
