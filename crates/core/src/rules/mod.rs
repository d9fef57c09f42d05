//! Reimbursement rule model and resolution.
//!
//! A rule decides how much an offerer is paid back for a used booking.
//! Rules are date-effective: each carries a half-open timespan, and the
//! timespans of same-scope rules must partition time without overlap.

pub mod error;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod resolver_props;

pub use error::RuleError;
pub use resolver::{resolve, RuleSet};
pub use types::{ReimbursementRule, RuleFormula, RuleScope, Timespan};
