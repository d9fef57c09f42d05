//! Batch jobs driving the pricing pipeline.
//!
//! Each job is one scheduled step: price claimed finance events, fold
//! validated pricings into a cashflow batch, bill generated cashflows.
//! Jobs own their transactions; per-record failures are routed (deferred
//! or parked for review) without aborting the run, while infrastructure
//! failures abort and roll back.

pub mod generate_cashflows;
pub mod generate_invoices;
pub mod price_events;

use sea_orm::DbErr;

use cachet_core::cashflow::CashflowError;

use crate::repositories::{
    BookingError, CashflowStoreError, FinanceEventError, InvoiceStoreError, PricingStoreError,
    RuleStoreError,
};

/// Fatal job errors: the run aborts and the transaction rolls back.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Invoicing was requested for a period with no generated batch.
    #[error("No cashflow batch generated for period {0}")]
    BatchNotFound(String),

    /// The rule store could not produce a usable rule set.
    #[error(transparent)]
    Rules(#[from] RuleStoreError),

    /// Event storage failed.
    #[error(transparent)]
    Events(#[from] FinanceEventError),

    /// Booking storage failed.
    #[error(transparent)]
    Bookings(#[from] BookingError),

    /// Pricing storage failed.
    #[error(transparent)]
    Pricings(#[from] PricingStoreError),

    /// Cashflow storage failed.
    #[error(transparent)]
    Cashflows(#[from] CashflowStoreError),

    /// The aggregator rejected the batch input.
    #[error(transparent)]
    Aggregation(#[from] CashflowError),

    /// Invoice storage failed.
    #[error(transparent)]
    Invoices(#[from] InvoiceStoreError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}
