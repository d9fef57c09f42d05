//! Finance event and pricing record types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cachet_shared::types::{BookingId, FinanceEventId, PricingId, RuleId, VenueId};

/// Lifecycle status of a finance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinanceEventStatus {
    /// Created but not yet resolvable (no applicable rule, or waiting on data).
    Pending,
    /// Resolvable and waiting to be priced.
    Ready,
    /// A validated pricing exists for this event.
    Priced,
    /// The underlying booking was cancelled before pricing.
    Cancelled,
}

impl std::fmt::Display for FinanceEventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Ready => "READY",
            Self::Priced => "PRICED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

/// A finance event: the fact that a booking became reimbursable (or that a
/// prior pricing must be corrected).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceEventSnapshot {
    pub id: FinanceEventId,
    pub booking_id: BookingId,
    pub status: FinanceEventStatus,
    /// The date the event takes effect, used as the pricing date.
    pub value_date: NaiveDate,
}

/// Lifecycle status of a pricing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingStatus {
    /// Computed and awaiting inclusion in a cashflow batch.
    Validated,
    /// Superseded by a correction; excluded from all future aggregation.
    Cancelled,
    /// Included in a generated cashflow batch.
    Processed,
}

impl std::fmt::Display for PricingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validated => "VALIDATED",
            Self::Cancelled => "CANCELLED",
            Self::Processed => "PROCESSED",
        };
        write!(f, "{s}")
    }
}

/// A persisted pricing record. Immutable once written: corrections cancel
/// the row and insert a new one linked via `parent_pricing_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSnapshot {
    pub id: PricingId,
    pub event_id: FinanceEventId,
    pub booking_id: BookingId,
    pub venue_id: VenueId,
    pub rule_id: RuleId,
    /// Reimbursed amount in euros, rounded to the cent, always non-negative.
    pub amount: Decimal,
    pub pricing_date: NaiveDate,
    pub status: PricingStatus,
    /// Set when this pricing supersedes a cancelled one.
    pub parent_pricing_id: Option<PricingId>,
}

/// A pricing computed by the calculator but not yet persisted.
///
/// The id is assigned at persistence time so the calculation itself stays
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingDraft {
    pub event_id: FinanceEventId,
    pub booking_id: BookingId,
    pub venue_id: VenueId,
    pub rule_id: RuleId,
    pub amount: Decimal,
    pub pricing_date: NaiveDate,
    pub parent_pricing_id: Option<PricingId>,
}

/// Result of pricing one finance event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingOutcome {
    /// Prior pricing to cancel before inserting the draft, if any.
    pub cancel_prior: Option<PricingId>,
    /// The new pricing to insert.
    pub draft: PricingDraft,
}
