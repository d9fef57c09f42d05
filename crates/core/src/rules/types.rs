//! Reimbursement rule types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cachet_shared::types::{OfferId, OffererId, RuleId};

use crate::booking::BookingSnapshot;

/// Half-open validity interval `[start, end)`.
///
/// `end = None` means the rule is open-ended (still in force).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timespan {
    /// First day the rule applies (inclusive).
    pub start: NaiveDate,
    /// First day the rule no longer applies (exclusive), if end-dated.
    pub end: Option<NaiveDate>,
}

impl Timespan {
    /// Creates a timespan; `end`, when present, must be after `start`.
    #[must_use]
    pub const fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Open-ended timespan starting at `start`.
    #[must_use]
    pub const fn starting(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    /// Returns true if `date` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.is_none_or(|end| date < end)
    }

    /// Returns true if two half-open intervals share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let self_before_other = self.end.is_some_and(|end| end <= other.start);
        let other_before_self = other.end.is_some_and(|end| end <= self.start);
        !(self_before_other || other_before_self)
    }

    /// Returns true if the interval is well-formed (`end > start` when end-dated).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.end.is_none_or(|end| end > self.start)
    }
}

/// How the reimbursement amount is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFormula {
    /// Proportional: `booking total * rate`.
    Rate(Decimal),
    /// Flat amount regardless of the booking total.
    FixedAmount(Decimal),
}

impl RuleFormula {
    /// Returns true if the formula's figure is non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Rate(rate) => *rate >= Decimal::ZERO,
            Self::FixedAmount(amount) => *amount >= Decimal::ZERO,
        }
    }
}

/// What a rule applies to, as an explicit sum type.
///
/// Precedence when several rules match a booking:
/// custom-offer, then custom-offerer, then subcategory-specific standard,
/// then generic standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RuleScope {
    /// Sector-wide rule, optionally restricted to one offer subcategory.
    Standard {
        /// Subcategory filter; `None` matches every booking.
        subcategory: Option<String>,
    },
    /// Override negotiated for a single offer.
    CustomOffer {
        /// The offer the override applies to.
        offer_id: OfferId,
    },
    /// Override negotiated for a whole offerer.
    CustomOfferer {
        /// The offerer the override applies to.
        offerer_id: OffererId,
    },
}

impl RuleScope {
    /// Resolution precedence, lower wins.
    #[must_use]
    pub fn precedence(&self) -> u8 {
        match self {
            Self::CustomOffer { .. } => 0,
            Self::CustomOfferer { .. } => 1,
            Self::Standard {
                subcategory: Some(_),
            } => 2,
            Self::Standard { subcategory: None } => 3,
        }
    }

    /// Returns true if the scope is a custom (offer/offerer) override.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        !matches!(self, Self::Standard { .. })
    }
}

/// A date-effective reimbursement rule.
///
/// Rules are end-dated when superseded and never deleted once applied,
/// so every historical pricing can name the exact rule it used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementRule {
    /// Rule identifier.
    pub id: RuleId,
    /// Human-readable label (e.g. "Remboursement total livres").
    pub label: String,
    /// Amount formula.
    pub formula: RuleFormula,
    /// What the rule applies to.
    pub scope: RuleScope,
    /// Validity interval.
    pub timespan: Timespan,
}

impl ReimbursementRule {
    /// Returns true if this rule covers `booking` on `date`.
    #[must_use]
    pub fn matches(&self, booking: &BookingSnapshot, date: NaiveDate) -> bool {
        if !self.timespan.contains(date) {
            return false;
        }
        match &self.scope {
            RuleScope::Standard { subcategory: None } => true,
            RuleScope::Standard {
                subcategory: Some(wanted),
            } => booking.subcategory.as_deref() == Some(wanted.as_str()),
            RuleScope::CustomOffer { offer_id } => booking.offer_id == *offer_id,
            RuleScope::CustomOfferer { offerer_id } => booking.offerer_id == *offerer_id,
        }
    }

    /// Scope key used for the non-overlap invariant: two rules conflict
    /// only when they share the same key and their timespans overlap.
    #[must_use]
    pub fn scope_key(&self) -> ScopeKey<'_> {
        match &self.scope {
            RuleScope::Standard { subcategory } => ScopeKey::Standard(subcategory.as_deref()),
            RuleScope::CustomOffer { offer_id } => ScopeKey::Offer(*offer_id),
            RuleScope::CustomOfferer { offerer_id } => ScopeKey::Offerer(*offerer_id),
        }
    }
}

/// Identity of a rule scope for overlap checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKey<'a> {
    /// Standard rule keyed by its subcategory filter.
    Standard(Option<&'a str>),
    /// Custom rule keyed by offer.
    Offer(OfferId),
    /// Custom rule keyed by offerer.
    Offerer(OffererId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::BookingStatus;
    use cachet_shared::types::{BookingId, VenueId};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booking() -> BookingSnapshot {
        BookingSnapshot {
            id: BookingId::new(),
            offer_id: OfferId::new(),
            offerer_id: OffererId::new(),
            venue_id: VenueId::new(),
            subcategory: Some("LIVRE_PAPIER".to_string()),
            amount: dec!(23.00),
            quantity: 1,
            status: BookingStatus::Used,
            used_date: Some(date(2024, 3, 1)),
        }
    }

    #[test]
    fn test_timespan_contains_half_open() {
        let span = Timespan::new(date(2024, 1, 1), Some(date(2024, 6, 1)));
        assert!(span.contains(date(2024, 1, 1)));
        assert!(span.contains(date(2024, 5, 31)));
        assert!(!span.contains(date(2024, 6, 1)));
        assert!(!span.contains(date(2023, 12, 31)));
    }

    #[test]
    fn test_open_ended_timespan() {
        let span = Timespan::starting(date(2024, 6, 1));
        assert!(span.contains(date(2030, 1, 1)));
        assert!(!span.contains(date(2024, 5, 31)));
    }

    #[test]
    fn test_adjacent_timespans_do_not_overlap() {
        let first = Timespan::new(date(2024, 1, 1), Some(date(2024, 6, 1)));
        let second = Timespan::starting(date(2024, 6, 1));
        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
    }

    #[test]
    fn test_overlapping_timespans_detected() {
        let first = Timespan::new(date(2024, 1, 1), Some(date(2024, 6, 1)));
        let second = Timespan::starting(date(2024, 5, 1));
        assert!(first.overlaps(&second));
        assert!(second.overlaps(&first));
    }

    #[test]
    fn test_two_open_ended_timespans_overlap() {
        let first = Timespan::starting(date(2024, 1, 1));
        let second = Timespan::starting(date(2025, 1, 1));
        assert!(first.overlaps(&second));
    }

    #[test]
    fn test_scope_precedence_ordering() {
        let offer = RuleScope::CustomOffer {
            offer_id: OfferId::new(),
        };
        let offerer = RuleScope::CustomOfferer {
            offerer_id: OffererId::new(),
        };
        let specific = RuleScope::Standard {
            subcategory: Some("LIVRE_PAPIER".to_string()),
        };
        let generic = RuleScope::Standard { subcategory: None };

        assert!(offer.precedence() < offerer.precedence());
        assert!(offerer.precedence() < specific.precedence());
        assert!(specific.precedence() < generic.precedence());
    }

    #[test]
    fn test_subcategory_rule_matches_only_its_subcategory() {
        let booking = booking();
        let rule = ReimbursementRule {
            id: RuleId::new(),
            label: "Livres".to_string(),
            formula: RuleFormula::Rate(dec!(1.00)),
            scope: RuleScope::Standard {
                subcategory: Some("LIVRE_PAPIER".to_string()),
            },
            timespan: Timespan::starting(date(2024, 1, 1)),
        };
        assert!(rule.matches(&booking, date(2024, 3, 1)));

        let mut other = booking.clone();
        other.subcategory = Some("CINEMA".to_string());
        assert!(!rule.matches(&other, date(2024, 3, 1)));
    }

    #[test]
    fn test_custom_offer_rule_matches_only_its_offer() {
        let booking = booking();
        let rule = ReimbursementRule {
            id: RuleId::new(),
            label: "Deal".to_string(),
            formula: RuleFormula::FixedAmount(dec!(5.00)),
            scope: RuleScope::CustomOffer {
                offer_id: booking.offer_id,
            },
            timespan: Timespan::starting(date(2024, 1, 1)),
        };
        assert!(rule.matches(&booking, date(2024, 3, 1)));

        let mut other = booking.clone();
        other.offer_id = OfferId::new();
        assert!(!rule.matches(&other, date(2024, 3, 1)));
    }

    #[test]
    fn test_rule_outside_timespan_never_matches() {
        let booking = booking();
        let rule = ReimbursementRule {
            id: RuleId::new(),
            label: "Old".to_string(),
            formula: RuleFormula::Rate(dec!(1.00)),
            scope: RuleScope::Standard { subcategory: None },
            timespan: Timespan::new(date(2023, 1, 1), Some(date(2024, 1, 1))),
        };
        assert!(!rule.matches(&booking, date(2024, 3, 1)));
    }

    #[test]
    fn test_formula_validity() {
        assert!(RuleFormula::Rate(dec!(0.95)).is_valid());
        assert!(RuleFormula::FixedAmount(dec!(0)).is_valid());
        assert!(!RuleFormula::Rate(dec!(-0.1)).is_valid());
    }
}
