//! Property-based tests for rule validation and resolution.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use cachet_shared::types::{BookingId, OfferId, OffererId, RuleId, VenueId};

use super::error::RuleError;
use super::resolver::{resolve, RuleSet};
use super::types::{ReimbursementRule, RuleFormula, RuleScope, Timespan};
use crate::booking::{BookingSnapshot, BookingStatus};
use crate::flags::FlagSnapshot;

/// Strategy to generate dates from 2020-01-01 to 2030-12-28.
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..=2030, 1u32..=12, 1u32..=28)
        .prop_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

/// Strategy to generate a well-formed timespan (open-ended or bounded).
fn timespan_strategy() -> impl Strategy<Value = Timespan> {
    (date_strategy(), proptest::option::of(1i64..=720)).prop_map(|(start, days)| {
        Timespan::new(start, days.map(|d| start + chrono::Duration::days(d)))
    })
}

/// Strategy to generate reimbursement rates between 0.01 and 1.00.
fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=100).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn standard_rule(rate: Decimal, timespan: Timespan) -> ReimbursementRule {
    ReimbursementRule {
        id: RuleId::new(),
        label: "Standard".to_string(),
        formula: RuleFormula::Rate(rate),
        scope: RuleScope::Standard { subcategory: None },
        timespan,
    }
}

fn used_booking(used_date: NaiveDate) -> BookingSnapshot {
    BookingSnapshot {
        id: BookingId::new(),
        offer_id: OfferId::new(),
        offerer_id: OffererId::new(),
        venue_id: VenueId::new(),
        subcategory: None,
        amount: Decimal::new(2300, 2),
        quantity: 1,
        status: BookingStatus::Used,
        used_date: Some(used_date),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any two same-scope rules whose timespans share a day, building
    /// the rule set fails with OverlappingTimespans.
    #[test]
    fn prop_overlapping_same_scope_rules_rejected(
        first_span in timespan_strategy(),
        second_span in timespan_strategy(),
        rate in rate_strategy(),
    ) {
        prop_assume!(first_span.overlaps(&second_span));

        let result = RuleSet::new(vec![
            standard_rule(rate, first_span),
            standard_rule(rate, second_span),
        ]);

        prop_assert!(
            matches!(result, Err(RuleError::OverlappingTimespans { .. })),
            "overlapping same-scope timespans must be rejected"
        );
    }

    /// For any two same-scope rules whose timespans do not overlap, the
    /// rule set is accepted.
    #[test]
    fn prop_disjoint_same_scope_rules_accepted(
        start in date_strategy(),
        first_len in 1i64..=365,
        gap in 0i64..=365,
        rate in rate_strategy(),
    ) {
        let first_end = start + chrono::Duration::days(first_len);
        let second_start = first_end + chrono::Duration::days(gap);
        let first = standard_rule(rate, Timespan::new(start, Some(first_end)));
        let second = standard_rule(rate, Timespan::starting(second_start));

        prop_assert!(RuleSet::new(vec![first, second]).is_ok());
    }

    /// Overlap detection is symmetric.
    #[test]
    fn prop_overlap_is_symmetric(
        a in timespan_strategy(),
        b in timespan_strategy(),
    ) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    /// For any date inside exactly one of two consecutive rule periods,
    /// resolution picks the rule whose timespan contains the date.
    #[test]
    fn prop_resolution_respects_effective_timespan(
        boundary in date_strategy(),
        offset in 0i64..=364,
        rate_before in rate_strategy(),
        rate_after in rate_strategy(),
    ) {
        let epoch = boundary - chrono::Duration::days(365);
        let before = standard_rule(rate_before, Timespan::new(epoch, Some(boundary)));
        let after = standard_rule(rate_after, Timespan::starting(boundary));
        let before_id = before.id;
        let after_id = after.id;
        let rules = RuleSet::new(vec![before, after]).unwrap();

        // A date on or after the boundary selects the later rule.
        let date = boundary + chrono::Duration::days(offset);
        let booking = used_booking(epoch);
        let rule = resolve(&booking, date, &rules, &FlagSnapshot::default()).unwrap();
        prop_assert_eq!(rule.id, after_id);

        // A date strictly before the boundary selects the earlier rule.
        let date = boundary - chrono::Duration::days(offset + 1);
        if date >= epoch {
            let rule = resolve(&booking, date, &rules, &FlagSnapshot::default()).unwrap();
            prop_assert_eq!(rule.id, before_id);
        }
    }

    /// Resolution is deterministic: the same inputs always return the
    /// same rule.
    #[test]
    fn prop_resolution_is_deterministic(
        used in date_strategy(),
        rate in rate_strategy(),
    ) {
        let rules = RuleSet::new(vec![standard_rule(
            rate,
            Timespan::starting(used - chrono::Duration::days(30)),
        )])
        .unwrap();
        let booking = used_booking(used);

        let first = resolve(&booking, used, &rules, &FlagSnapshot::default()).unwrap();
        let second = resolve(&booking, used, &rules, &FlagSnapshot::default()).unwrap();
        prop_assert_eq!(first.id, second.id);
    }
}
