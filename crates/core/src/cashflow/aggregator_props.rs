//! Property-based tests for the cashflow aggregator.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use rust_decimal::Decimal;

use cachet_shared::types::{BankAccountId, OffererId, PricingId, VenueId};

use crate::cashflow::aggregator::{aggregate, BankDirectory};
use crate::cashflow::types::PricingLine;
use crate::flags::FlagSnapshot;

/// A small closed world: a handful of venues, some mapped to bank
/// accounts, and pricing lines spread across them.
fn world_strategy() -> impl Strategy<Value = (Vec<PricingLine>, BankDirectory)> {
    (2usize..=6, 0usize..=6)
        .prop_flat_map(|(venue_count, mapped_count)| {
            let venues: Vec<VenueId> = (0..venue_count).map(|_| VenueId::new()).collect();
            let mapped = venues
                .iter()
                .take(mapped_count.min(venue_count))
                .map(|&venue| (venue, BankAccountId::new()))
                .collect::<HashMap<_, _>>();
            let directory = BankDirectory::new(mapped, HashMap::new());
            let lines = proptest::collection::vec((0usize..venue_count, 0i64..=50_000), 0..=40)
                .prop_map(move |picks| {
                    picks
                        .into_iter()
                        .map(|(venue_index, cents)| PricingLine {
                            pricing_id: PricingId::new(),
                            venue_id: venues[venue_index],
                            offerer_id: OffererId::new(),
                            amount: Decimal::new(cents, 2),
                        })
                        .collect::<Vec<_>>()
                });
            (lines, Just(directory))
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Conservation: cashflow totals plus deferred amounts equal the
    /// input total. No money appears or disappears.
    #[test]
    fn prop_amounts_are_conserved((lines, banks) in world_strategy()) {
        let result = aggregate(&lines, &banks, &FlagSnapshot::default()).unwrap();

        let input_total: Decimal = lines.iter().map(|l| l.amount).sum();
        let deferred_total: Decimal = result.deferred.iter().map(|d| d.amount).sum();
        prop_assert_eq!(result.total_amount() + deferred_total, input_total);
    }

    /// Every pricing lands in exactly one place: one cashflow or the
    /// deferred list, never both, never twice.
    #[test]
    fn prop_each_pricing_lands_exactly_once((lines, banks) in world_strategy()) {
        let result = aggregate(&lines, &banks, &FlagSnapshot::default()).unwrap();

        let mut placed = HashSet::new();
        for cashflow in &result.cashflows {
            for pricing_id in &cashflow.pricing_ids {
                prop_assert!(placed.insert(*pricing_id), "pricing placed twice");
            }
        }
        for deferral in &result.deferred {
            prop_assert!(placed.insert(deferral.pricing_id), "pricing placed twice");
        }
        prop_assert_eq!(placed.len(), lines.len());
    }

    /// Aggregation is deterministic: the same inputs produce identical
    /// drafts in identical order.
    #[test]
    fn prop_aggregation_is_deterministic((lines, banks) in world_strategy()) {
        let flags = FlagSnapshot::default();
        let first = aggregate(&lines, &banks, &flags).unwrap();
        let second = aggregate(&lines, &banks, &flags).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Each cashflow's amount equals the sum of its member lines.
    #[test]
    fn prop_cashflow_amount_matches_members((lines, banks) in world_strategy()) {
        let result = aggregate(&lines, &banks, &FlagSnapshot::default()).unwrap();
        let by_id: HashMap<PricingId, Decimal> =
            lines.iter().map(|l| (l.pricing_id, l.amount)).collect();

        for cashflow in &result.cashflows {
            let member_total: Decimal =
                cashflow.pricing_ids.iter().map(|id| by_id[id]).sum();
            prop_assert_eq!(cashflow.amount, member_total);
        }
    }

    /// With the fallback flag on, turning it off can only move lines from
    /// cashflows to the deferred list, never invent new payments.
    #[test]
    fn prop_fallback_flag_only_adds_coverage((lines, banks) in world_strategy()) {
        let without = aggregate(&lines, &banks, &FlagSnapshot::default()).unwrap();
        let with = aggregate(
            &lines,
            &banks,
            &FlagSnapshot { offerer_bank_fallback: true, ..FlagSnapshot::default() },
        )
        .unwrap();

        prop_assert!(with.deferred.len() <= without.deferred.len());
        prop_assert!(with.total_amount() >= without.total_amount());
    }
}
