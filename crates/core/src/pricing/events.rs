//! Finance-event status transitions.

use crate::pricing::error::PricingError;
use crate::pricing::types::FinanceEventStatus;

/// Validates a finance-event status transition.
///
/// Allowed: PENDING -> READY, READY -> PRICED, PENDING/READY -> CANCELLED.
/// PRICED and CANCELLED are terminal. No step is skippable: an event must
/// pass through READY before it can be priced.
pub fn validate_transition(
    from: FinanceEventStatus,
    to: FinanceEventStatus,
) -> Result<(), PricingError> {
    let valid = match (from, to) {
        // Same status is a no-op - always valid
        _ if from == to => true,
        (FinanceEventStatus::Pending, FinanceEventStatus::Ready | FinanceEventStatus::Cancelled)
        | (FinanceEventStatus::Ready, FinanceEventStatus::Priced | FinanceEventStatus::Cancelled) => {
            true
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(PricingError::InvalidTransition { from, to })
    }
}
