//! Rule resolution error types.

use chrono::NaiveDate;
use thiserror::Error;

use cachet_shared::types::{BookingId, RuleId};

use crate::booking::BookingStatus;

/// Errors that can occur while validating or resolving reimbursement rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// No rule covers the booking on the pricing date.
    ///
    /// Deferred condition: the finance event stays pending and is retried
    /// on the next scheduled run.
    #[error("No applicable rule for booking {booking_id} on {date}")]
    NoApplicableRule {
        /// The booking being priced.
        booking_id: BookingId,
        /// The pricing date used for resolution.
        date: NaiveDate,
    },

    /// Two rules at the same precedence level both cover the booking.
    ///
    /// Data-integrity violation (the non-overlap invariant is broken);
    /// never silently resolved by picking one.
    #[error("Rules {first} and {second} both apply on {date}")]
    AmbiguousRule {
        /// One of the conflicting rules.
        first: RuleId,
        /// The other conflicting rule.
        second: RuleId,
        /// The pricing date both rules cover.
        date: NaiveDate,
    },

    /// Two same-scope rules have overlapping validity intervals.
    #[error("Rules {first} and {second} have overlapping timespans for the same scope")]
    OverlappingTimespans {
        /// One of the conflicting rules.
        first: RuleId,
        /// The other conflicting rule.
        second: RuleId,
    },

    /// A rule's validity interval ends on or before it starts.
    #[error("Rule {rule_id} has an invalid timespan")]
    InvalidTimespan {
        /// The malformed rule.
        rule_id: RuleId,
    },

    /// A rule's rate or fixed amount is negative.
    #[error("Rule {rule_id} has an invalid formula")]
    InvalidFormula {
        /// The malformed rule.
        rule_id: RuleId,
    },

    /// The pricing date falls outside the booking's eligibility window.
    #[error(
        "Booking {booking_id} is not eligible for pricing on {date} (status {status})"
    )]
    OutsideEligibilityWindow {
        /// The booking being priced.
        booking_id: BookingId,
        /// The rejected pricing date.
        date: NaiveDate,
        /// The booking's current status.
        status: BookingStatus,
    },
}

impl RuleError {
    /// Returns true if the error is transient and the record should simply
    /// be retried on the next run (as opposed to parked for manual review).
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::NoApplicableRule { .. })
    }
}
