//! Per-run feature flag snapshot.
//!
//! Flags are read once at batch start and passed by value into the
//! pipeline, so a run's behavior never changes mid-batch.

use serde::{Deserialize, Serialize};

/// Feature flags frozen for the duration of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSnapshot {
    /// When true, custom (offer/offerer scoped) rules participate in
    /// resolution; when false only standard rules apply.
    pub custom_rules_enabled: bool,
    /// When true, a venue without a bank account link falls back to an
    /// offerer-level bank account during aggregation.
    pub offerer_bank_fallback: bool,
}

impl Default for FlagSnapshot {
    fn default() -> Self {
        Self {
            custom_rules_enabled: true,
            offerer_bank_fallback: false,
        }
    }
}
