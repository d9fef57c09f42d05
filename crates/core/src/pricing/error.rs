//! Pricing error types.

use thiserror::Error;

use cachet_shared::types::{BookingId, FinanceEventId, PricingId};

use crate::booking::BookingStatus;
use crate::pricing::types::{FinanceEventStatus, PricingStatus};
use crate::rules::RuleError;

/// Errors that can occur while pricing a finance event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Rule resolution failed.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// The event does not reference the booking it was priced against.
    #[error("Event {event_id} references booking {expected}, got {actual}")]
    EventBookingMismatch {
        event_id: FinanceEventId,
        expected: BookingId,
        actual: BookingId,
    },

    /// The event is not in a priceable state.
    #[error("Event {event_id} cannot be priced in status {status}")]
    EventNotPriceable {
        event_id: FinanceEventId,
        status: FinanceEventStatus,
    },

    /// The event and booking statuses disagree (e.g. a ready event over a
    /// cancelled booking). Parked for manual review.
    #[error(
        "Event {event_id} in status {event_status} is inconsistent with booking status {booking_status}"
    )]
    InconsistentBookingState {
        event_id: FinanceEventId,
        event_status: FinanceEventStatus,
        booking_status: BookingStatus,
    },

    /// A correction targets a pricing that is not in a correctable status.
    #[error("Pricing {pricing_id} in status {status} cannot be corrected")]
    PriorNotCorrectable {
        pricing_id: PricingId,
        status: PricingStatus,
    },

    /// An illegal finance-event status transition was requested.
    #[error("Cannot transition event from {from} to {to}")]
    InvalidTransition {
        from: FinanceEventStatus,
        to: FinanceEventStatus,
    },
}

impl PricingError {
    /// Returns true if the condition is transient and the event should be
    /// retried on the next run rather than parked for manual review.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        match self {
            Self::Rule(rule_error) => rule_error.is_deferred(),
            _ => false,
        }
    }
}
