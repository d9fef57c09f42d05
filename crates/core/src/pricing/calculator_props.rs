//! Property-based tests for the pricing calculator.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use cachet_shared::types::{BookingId, FinanceEventId, OfferId, OffererId, RuleId, VenueId};

use crate::booking::{BookingSnapshot, BookingStatus};
use crate::flags::FlagSnapshot;
use crate::pricing::calculator::price;
use crate::pricing::types::{FinanceEventSnapshot, FinanceEventStatus};
use crate::rules::{ReimbursementRule, RuleFormula, RuleScope, RuleSet, Timespan};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    // Cents from 0.01 to 500.00
    (1i64..=50_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=100).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn fixture(
    amount: Decimal,
    quantity: u32,
    rate: Decimal,
) -> (FinanceEventSnapshot, BookingSnapshot, RuleSet) {
    let used = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let booking = BookingSnapshot {
        id: BookingId::new(),
        offer_id: OfferId::new(),
        offerer_id: OffererId::new(),
        venue_id: VenueId::new(),
        subcategory: None,
        amount,
        quantity,
        status: BookingStatus::Used,
        used_date: Some(used),
    };
    let event = FinanceEventSnapshot {
        id: FinanceEventId::new(),
        booking_id: booking.id,
        status: FinanceEventStatus::Ready,
        value_date: used,
    };
    let rules = RuleSet::new(vec![ReimbursementRule {
        id: RuleId::new(),
        label: "Standard".to_string(),
        formula: RuleFormula::Rate(rate),
        scope: RuleScope::Standard { subcategory: None },
        timespan: Timespan::starting(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
    }])
    .unwrap();
    (event, booking, rules)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The priced amount never has more than 2 decimal places and never
    /// exceeds the booking total (rates are at most 100%).
    #[test]
    fn prop_amount_is_bounded_and_cent_precise(
        amount in amount_strategy(),
        quantity in 1u32..=10,
        rate in rate_strategy(),
    ) {
        let (event, booking, rules) = fixture(amount, quantity, rate);
        let outcome = price(&event, &booking, &rules, &FlagSnapshot::default(), None).unwrap();

        prop_assert!(outcome.draft.amount >= Decimal::ZERO);
        prop_assert!(outcome.draft.amount.scale() <= 2);
        // Banker's rounding moves the result by at most half a cent.
        let exact = booking.total_amount() * rate;
        prop_assert!((outcome.draft.amount - exact).abs() <= Decimal::new(5, 3));
    }

    /// Pricing is deterministic across calls.
    #[test]
    fn prop_pricing_is_deterministic(
        amount in amount_strategy(),
        quantity in 1u32..=10,
        rate in rate_strategy(),
    ) {
        let (event, booking, rules) = fixture(amount, quantity, rate);
        let flags = FlagSnapshot::default();

        let first = price(&event, &booking, &rules, &flags, None).unwrap();
        let second = price(&event, &booking, &rules, &flags, None).unwrap();
        prop_assert_eq!(first, second);
    }

    /// A full rate reimburses exactly the booking total.
    #[test]
    fn prop_full_rate_reimburses_total(
        amount in amount_strategy(),
        quantity in 1u32..=10,
    ) {
        let (event, booking, rules) = fixture(amount, quantity, Decimal::ONE);
        let outcome = price(&event, &booking, &rules, &FlagSnapshot::default(), None).unwrap();
        prop_assert_eq!(outcome.draft.amount, booking.total_amount());
    }
}
