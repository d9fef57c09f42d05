//! Core pricing logic for Cachet.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Repositories hand it fully-materialized value objects (booking snapshots,
//! rule snapshots); everything here is deterministic given its inputs.
//!
//! # Modules
//!
//! - `rules` - Reimbursement rule model and resolution
//! - `pricing` - Finance-event lifecycle and pricing calculation
//! - `cashflow` - Aggregation of pricings into payment instructions
//! - `invoice` - Invoice reference numbering
//! - `flags` - Per-run feature flag snapshot

pub mod booking;
pub mod cashflow;
pub mod flags;
pub mod invoice;
pub mod pricing;
pub mod rules;
