//! Rule resolution.
//!
//! The resolver works over a `RuleSet` snapshot loaded once per batch run,
//! so resolution never touches the database and two runs over the same
//! snapshot behave identically.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::booking::BookingSnapshot;
use crate::flags::FlagSnapshot;
use crate::rules::error::RuleError;
use crate::rules::types::{ReimbursementRule, ScopeKey};

/// A validated snapshot of every rule in force, custom and standard.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<ReimbursementRule>,
}

impl RuleSet {
    /// Builds a rule set, validating each rule and the same-scope
    /// non-overlap invariant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimespan`/`InvalidFormula` for a malformed rule and
    /// `OverlappingTimespans` when two same-scope rules share a day.
    pub fn new(rules: Vec<ReimbursementRule>) -> Result<Self, RuleError> {
        for rule in &rules {
            if !rule.timespan.is_valid() {
                return Err(RuleError::InvalidTimespan { rule_id: rule.id });
            }
            if !rule.formula.is_valid() {
                return Err(RuleError::InvalidFormula { rule_id: rule.id });
            }
        }
        Self::check_no_overlap(&rules)?;
        Ok(Self { rules })
    }

    /// Returns the rules in this snapshot.
    #[must_use]
    pub fn rules(&self) -> &[ReimbursementRule] {
        &self.rules
    }

    /// Returns true if the snapshot holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Pairwise overlap check within each scope key.
    ///
    /// Rule counts are small (tens per scope at worst), so the quadratic
    /// scan inside a scope is fine.
    fn check_no_overlap(rules: &[ReimbursementRule]) -> Result<(), RuleError> {
        let mut by_scope: HashMap<ScopeKey<'_>, Vec<&ReimbursementRule>> = HashMap::new();
        for rule in rules {
            by_scope.entry(rule.scope_key()).or_default().push(rule);
        }

        for group in by_scope.values() {
            for (i, first) in group.iter().enumerate() {
                for second in &group[i + 1..] {
                    if first.timespan.overlaps(&second.timespan) {
                        return Err(RuleError::OverlappingTimespans {
                            first: first.id,
                            second: second.id,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Resolves the rule in effect for `booking` on `pricing_date`.
///
/// Custom rules win over standard ones; within standard rules a
/// subcategory-specific rule wins over a generic one. Two matches at the
/// same precedence level are a data-integrity violation and fail with
/// `AmbiguousRule` rather than silently picking one.
///
/// # Errors
///
/// - `OutsideEligibilityWindow` if the booking is not used, was cancelled,
///   or was used after `pricing_date`.
/// - `AmbiguousRule` on a same-precedence tie.
/// - `NoApplicableRule` if nothing covers the date (deferred condition).
pub fn resolve<'a>(
    booking: &BookingSnapshot,
    pricing_date: NaiveDate,
    rules: &'a RuleSet,
    flags: &FlagSnapshot,
) -> Result<&'a ReimbursementRule, RuleError> {
    if !booking.is_priceable() || booking.used_date.is_some_and(|used| used > pricing_date) {
        return Err(RuleError::OutsideEligibilityWindow {
            booking_id: booking.id,
            date: pricing_date,
            status: booking.status,
        });
    }

    let candidates = rules.rules().iter().filter(|rule| {
        (flags.custom_rules_enabled || !rule.scope.is_custom())
            && rule.matches(booking, pricing_date)
    });

    // Lowest precedence value wins; a tie at that value is ambiguous.
    let mut best: Option<&ReimbursementRule> = None;
    for rule in candidates {
        match best {
            None => best = Some(rule),
            Some(current) => {
                if rule.scope.precedence() < current.scope.precedence() {
                    best = Some(rule);
                } else if rule.scope.precedence() == current.scope.precedence() {
                    return Err(RuleError::AmbiguousRule {
                        first: current.id,
                        second: rule.id,
                        date: pricing_date,
                    });
                }
            }
        }
    }

    best.ok_or(RuleError::NoApplicableRule {
        booking_id: booking.id,
        date: pricing_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::BookingStatus;
    use crate::rules::types::{RuleFormula, RuleScope, Timespan};
    use cachet_shared::types::{BookingId, OfferId, OffererId, RuleId, VenueId};
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

    fn standard_rule(rate: &str, span: Timespan) -> ReimbursementRule {
        ReimbursementRule {
            id: RuleId::new(),
            label: "Standard".to_string(),
            formula: RuleFormula::Rate(rate.parse().unwrap()),
            scope: RuleScope::Standard { subcategory: None },
            timespan: span,
        }
    }

    #[test]
    fn test_standard_rule_resolved() {
        let booking = booking();
        let rules =
            RuleSet::new(vec![standard_rule("1.00", Timespan::starting(date(2024, 1, 1)))])
                .unwrap();

        let rule = resolve(&booking, date(2024, 3, 1), &rules, &FlagSnapshot::default()).unwrap();
        assert_eq!(rule.formula, RuleFormula::Rate(dec!(1.00)));
    }

    #[test]
    fn test_rule_effective_on_boundary_date() {
        // R1 covers [2024-01-01, 2024-06-01) at rate 1.0,
        // R2 covers [2024-06-01, inf) at rate 0.95.
        let r1 = standard_rule("1.00", Timespan::new(date(2024, 1, 1), Some(date(2024, 6, 1))));
        let r2 = standard_rule("0.95", Timespan::starting(date(2024, 6, 1)));
        let r2_id = r2.id;
        let rules = RuleSet::new(vec![r1, r2]).unwrap();

        let mut booking = booking();
        booking.used_date = Some(date(2024, 6, 15));

        let rule = resolve(&booking, date(2024, 6, 15), &rules, &FlagSnapshot::default()).unwrap();
        assert_eq!(rule.id, r2_id);
        assert_eq!(rule.formula, RuleFormula::Rate(dec!(0.95)));
    }

    #[test]
    fn test_custom_offer_rule_wins_over_standard() {
        let booking = booking();
        let standard = standard_rule("1.00", Timespan::starting(date(2024, 1, 1)));
        let custom = ReimbursementRule {
            id: RuleId::new(),
            label: "Deal".to_string(),
            formula: RuleFormula::Rate(dec!(0.80)),
            scope: RuleScope::CustomOffer {
                offer_id: booking.offer_id,
            },
            timespan: Timespan::starting(date(2024, 1, 1)),
        };
        let custom_id = custom.id;
        let rules = RuleSet::new(vec![standard, custom]).unwrap();

        let rule = resolve(&booking, date(2024, 3, 1), &rules, &FlagSnapshot::default()).unwrap();
        assert_eq!(rule.id, custom_id);
    }

    #[test]
    fn test_custom_offer_wins_over_custom_offerer() {
        let booking = booking();
        let offerer_rule = ReimbursementRule {
            id: RuleId::new(),
            label: "Offerer deal".to_string(),
            formula: RuleFormula::Rate(dec!(0.90)),
            scope: RuleScope::CustomOfferer {
                offerer_id: booking.offerer_id,
            },
            timespan: Timespan::starting(date(2024, 1, 1)),
        };
        let offer_rule = ReimbursementRule {
            id: RuleId::new(),
            label: "Offer deal".to_string(),
            formula: RuleFormula::FixedAmount(dec!(5.00)),
            scope: RuleScope::CustomOffer {
                offer_id: booking.offer_id,
            },
            timespan: Timespan::starting(date(2024, 1, 1)),
        };
        let offer_rule_id = offer_rule.id;
        let rules = RuleSet::new(vec![offerer_rule, offer_rule]).unwrap();

        let rule = resolve(&booking, date(2024, 3, 1), &rules, &FlagSnapshot::default()).unwrap();
        assert_eq!(rule.id, offer_rule_id);
    }

    #[test]
    fn test_subcategory_specific_wins_over_generic() {
        let booking = booking();
        let generic = standard_rule("1.00", Timespan::starting(date(2024, 1, 1)));
        let specific = ReimbursementRule {
            id: RuleId::new(),
            label: "Livres".to_string(),
            formula: RuleFormula::Rate(dec!(0.95)),
            scope: RuleScope::Standard {
                subcategory: Some("LIVRE_PAPIER".to_string()),
            },
            timespan: Timespan::starting(date(2024, 1, 1)),
        };
        let specific_id = specific.id;
        let rules = RuleSet::new(vec![generic, specific]).unwrap();

        let rule = resolve(&booking, date(2024, 3, 1), &rules, &FlagSnapshot::default()).unwrap();
        assert_eq!(rule.id, specific_id);
    }

    #[test]
    fn test_no_applicable_rule_is_deferred() {
        let booking = booking();
        let rules = RuleSet::new(vec![]).unwrap();

        let err = resolve(&booking, date(2024, 3, 1), &rules, &FlagSnapshot::default())
            .unwrap_err();
        assert!(matches!(err, RuleError::NoApplicableRule { .. }));
        assert!(err.is_deferred());
    }

    #[test]
    fn test_two_matching_custom_rules_are_ambiguous() {
        let booking = booking();
        let first = ReimbursementRule {
            id: RuleId::new(),
            label: "Deal A".to_string(),
            formula: RuleFormula::Rate(dec!(0.80)),
            scope: RuleScope::CustomOffer {
                offer_id: booking.offer_id,
            },
            timespan: Timespan::starting(date(2024, 1, 1)),
        };
        let mut second = first.clone();
        second.id = RuleId::new();
        // Simulate a broken store: same scope, overlapping spans,
        // bypassing RuleSet::new validation.
        let rules = RuleSet {
            rules: vec![first, second],
        };

        let err = resolve(&booking, date(2024, 3, 1), &rules, &FlagSnapshot::default())
            .unwrap_err();
        assert!(matches!(err, RuleError::AmbiguousRule { .. }));
        assert!(!err.is_deferred());
    }

    #[test]
    fn test_cancelled_booking_not_eligible() {
        let mut booking = booking();
        booking.status = BookingStatus::Cancelled;
        let rules =
            RuleSet::new(vec![standard_rule("1.00", Timespan::starting(date(2024, 1, 1)))])
                .unwrap();

        let err = resolve(&booking, date(2024, 3, 1), &rules, &FlagSnapshot::default())
            .unwrap_err();
        assert!(matches!(err, RuleError::OutsideEligibilityWindow { .. }));
    }

    #[test]
    fn test_pricing_date_before_used_date_not_eligible() {
        let booking = booking();
        let rules =
            RuleSet::new(vec![standard_rule("1.00", Timespan::starting(date(2024, 1, 1)))])
                .unwrap();

        let err = resolve(&booking, date(2024, 2, 1), &rules, &FlagSnapshot::default())
            .unwrap_err();
        assert!(matches!(err, RuleError::OutsideEligibilityWindow { .. }));
    }

    #[test]
    fn test_custom_rules_disabled_by_flag() {
        let booking = booking();
        let standard = standard_rule("1.00", Timespan::starting(date(2024, 1, 1)));
        let standard_id = standard.id;
        let custom = ReimbursementRule {
            id: RuleId::new(),
            label: "Deal".to_string(),
            formula: RuleFormula::Rate(dec!(0.50)),
            scope: RuleScope::CustomOffer {
                offer_id: booking.offer_id,
            },
            timespan: Timespan::starting(date(2024, 1, 1)),
        };
        let rules = RuleSet::new(vec![standard, custom]).unwrap();

        let flags = FlagSnapshot {
            custom_rules_enabled: false,
            ..FlagSnapshot::default()
        };
        let rule = resolve(&booking, date(2024, 3, 1), &rules, &flags).unwrap();
        assert_eq!(rule.id, standard_id);
    }

    #[test]
    fn test_overlapping_same_scope_rules_rejected_at_load() {
        let first = standard_rule("1.00", Timespan::new(date(2024, 1, 1), Some(date(2024, 6, 1))));
        let second = standard_rule("0.95", Timespan::starting(date(2024, 5, 1)));

        let err = RuleSet::new(vec![first, second]).unwrap_err();
        assert!(matches!(err, RuleError::OverlappingTimespans { .. }));
    }

    #[test]
    fn test_invalid_timespan_rejected_at_load() {
        let rule = standard_rule("1.00", Timespan::new(date(2024, 6, 1), Some(date(2024, 6, 1))));
        let err = RuleSet::new(vec![rule]).unwrap_err();
        assert!(matches!(err, RuleError::InvalidTimespan { .. }));
    }
}
