//! Finance-event lifecycle and pricing calculation.
//!
//! A finance event marks that a booking became reimbursable; pricing an
//! event applies the resolved rule to the booking amount and yields an
//! immutable `Pricing` record. Corrections never mutate history: the
//! prior pricing is cancelled and a new linked row is produced.

pub mod amounts;
pub mod calculator;
pub mod error;
pub mod events;
pub mod types;

#[cfg(test)]
mod calculator_props;

pub use calculator::price;
pub use error::PricingError;
pub use events::validate_transition;
pub use types::{
    FinanceEventSnapshot, FinanceEventStatus, PricingDraft, PricingOutcome, PricingSnapshot,
    PricingStatus,
};
