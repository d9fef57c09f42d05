//! Monetary rounding helpers.
//!
//! All reimbursement amounts are rounded to the cent using Banker's
//! Rounding (`MidpointNearestEven`), the standard accounting convention.

use rust_decimal::{Decimal, RoundingStrategy};

/// Euro amounts carry 2 decimal places.
pub const CENT_PRECISION: u32 = 2;

/// Rounds a euro amount to the cent using Banker's Rounding.
///
/// - 2.005 → 2.00 (to nearest even cent)
/// - 2.015 → 2.02 (to nearest even cent)
#[must_use]
pub fn round_to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENT_PRECISION, RoundingStrategy::MidpointNearestEven)
}
