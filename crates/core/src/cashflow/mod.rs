//! Aggregation of validated pricings into payment instructions.
//!
//! A cashflow is one bank transfer covering all of a bank account's
//! validated pricings for a batch period. Pricings whose venue cannot be
//! mapped to a bank account are deferred to a later batch instead of
//! blocking the run.

pub mod aggregator;
pub mod error;
pub mod types;

#[cfg(test)]
mod aggregator_props;

pub use aggregator::{aggregate, BankDirectory};
pub use error::CashflowError;
pub use types::{Aggregation, CashflowDraft, CashflowStatus, DeferredPricing, PricingLine};
