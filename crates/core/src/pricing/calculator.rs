//! The pricing calculator.
//!
//! Pure and deterministic: given the same event, booking, rule set and
//! flags, `price` always produces the same draft. Persistence (id
//! assignment, status updates, cancellation of the prior row) happens in
//! the db layer.

use crate::booking::{BookingSnapshot, BookingStatus};
use crate::flags::FlagSnapshot;
use crate::pricing::amounts::round_to_cents;
use crate::pricing::error::PricingError;
use crate::pricing::types::{
    FinanceEventSnapshot, FinanceEventStatus, PricingDraft, PricingOutcome, PricingSnapshot,
    PricingStatus,
};
use crate::rules::{resolve, RuleFormula, RuleSet};

/// Prices one finance event against its booking.
///
/// Resolves the applicable rule for the event's value date, applies the
/// rule formula to the booking total and rounds to the cent. When `prior`
/// is given the outcome is a correction: the prior pricing is marked for
/// cancellation and the draft links back to it.
///
/// # Errors
///
/// Returns a [`RuleError`](crate::rules::RuleError) wrapped in
/// [`PricingError::Rule`] when resolution fails, and pricing-specific
/// errors when the event, booking and prior pricing disagree.
pub fn price(
    event: &FinanceEventSnapshot,
    booking: &BookingSnapshot,
    rules: &RuleSet,
    flags: &FlagSnapshot,
    prior: Option<&PricingSnapshot>,
) -> Result<PricingOutcome, PricingError> {
    if event.booking_id != booking.id {
        return Err(PricingError::EventBookingMismatch {
            event_id: event.id,
            expected: event.booking_id,
            actual: booking.id,
        });
    }

    match event.status {
        FinanceEventStatus::Pending | FinanceEventStatus::Ready => {}
        // A priced event can only be re-priced as a correction.
        FinanceEventStatus::Priced if prior.is_some() => {}
        status => {
            return Err(PricingError::EventNotPriceable {
                event_id: event.id,
                status,
            });
        }
    }

    if booking.status == BookingStatus::Cancelled {
        // The event should have been cancelled alongside the booking.
        return Err(PricingError::InconsistentBookingState {
            event_id: event.id,
            event_status: event.status,
            booking_status: booking.status,
        });
    }

    let rule = resolve(booking, event.value_date, rules, flags)?;

    let amount = match rule.formula {
        RuleFormula::Rate(rate) => round_to_cents(booking.total_amount() * rate),
        RuleFormula::FixedAmount(amount) => round_to_cents(amount),
    };

    let parent_pricing_id = match prior {
        Some(prior) if prior.status == PricingStatus::Cancelled => {
            return Err(PricingError::PriorNotCorrectable {
                pricing_id: prior.id,
                status: prior.status,
            });
        }
        Some(prior) => Some(prior.id),
        None => None,
    };

    Ok(PricingOutcome {
        cancel_prior: parent_pricing_id,
        draft: PricingDraft {
            event_id: event.id,
            booking_id: booking.id,
            venue_id: booking.venue_id,
            rule_id: rule.id,
            amount,
            pricing_date: event.value_date,
            parent_pricing_id,
        },
    })
}
