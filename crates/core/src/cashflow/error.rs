//! Cashflow aggregation error types.

use thiserror::Error;

use cachet_shared::types::PricingId;

/// Errors that can occur while aggregating pricings into cashflows.
///
/// These are all data-integrity violations: the aggregator refuses to
/// produce a batch from inputs that break its invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CashflowError {
    /// The same pricing appears twice in one batch input.
    #[error("Pricing {pricing_id} appears more than once in the batch")]
    DuplicatePricing { pricing_id: PricingId },

    /// A pricing carries a negative amount.
    #[error("Pricing {pricing_id} has a negative amount")]
    NegativeAmount { pricing_id: PricingId },
}
