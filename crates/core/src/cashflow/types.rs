//! Cashflow value objects.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cachet_shared::types::{BankAccountId, OffererId, PricingId, VenueId};

/// Lifecycle status of a cashflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashflowStatus {
    /// Generated, waiting for the transfer file to be emitted.
    Pending,
    /// Included in a transfer file sent to the bank.
    UnderReview,
    /// Transfer accepted by the bank.
    Accepted,
}

impl std::fmt::Display for CashflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Accepted => "ACCEPTED",
        };
        write!(f, "{s}")
    }
}

/// One pricing flattened for aggregation.
///
/// The db layer joins pricings to their booking's venue and offerer before
/// handing them to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingLine {
    pub pricing_id: PricingId,
    pub venue_id: VenueId,
    pub offerer_id: OffererId,
    pub amount: Decimal,
}

/// One payment instruction: a single transfer to one bank account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashflowDraft {
    pub bank_account_id: BankAccountId,
    /// Sum of the member pricings' amounts, already cent-precise.
    pub amount: Decimal,
    /// Pricings covered by this transfer, in input order.
    pub pricing_ids: Vec<PricingId>,
}

/// A pricing excluded from the batch because no bank account could be
/// found for its venue. It stays VALIDATED and is retried next batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredPricing {
    pub pricing_id: PricingId,
    pub venue_id: VenueId,
    pub amount: Decimal,
}

/// Result of aggregating one batch period's validated pricings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// One draft per bank account, ordered by bank account id.
    pub cashflows: Vec<CashflowDraft>,
    /// Pricings pushed to the next batch.
    pub deferred: Vec<DeferredPricing>,
}

impl Aggregation {
    /// Total amount of all payment instructions.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.cashflows.iter().map(|c| c.amount).sum()
    }
}
