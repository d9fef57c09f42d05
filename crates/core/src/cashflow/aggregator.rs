//! The cashflow aggregator.
//!
//! Pure and deterministic: given the same pricing lines, bank directory
//! and flags, `aggregate` always produces the same drafts in the same
//! order. Idempotency across re-runs (not re-batching already PROCESSED
//! pricings) is enforced by the db layer's selection query.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;

use cachet_shared::types::{BankAccountId, OffererId, VenueId};

use crate::cashflow::error::CashflowError;
use crate::cashflow::types::{Aggregation, CashflowDraft, DeferredPricing, PricingLine};
use crate::flags::FlagSnapshot;

/// Bank account mappings materialized at batch start.
#[derive(Debug, Clone, Default)]
pub struct BankDirectory {
    venue_accounts: HashMap<VenueId, BankAccountId>,
    offerer_accounts: HashMap<OffererId, BankAccountId>,
}

impl BankDirectory {
    #[must_use]
    pub fn new(
        venue_accounts: HashMap<VenueId, BankAccountId>,
        offerer_accounts: HashMap<OffererId, BankAccountId>,
    ) -> Self {
        Self {
            venue_accounts,
            offerer_accounts,
        }
    }

    /// Resolves the bank account to pay for a pricing line.
    ///
    /// The venue-level link wins; the offerer-level account is only
    /// consulted when the fallback flag is on.
    fn account_for(&self, line: &PricingLine, flags: &FlagSnapshot) -> Option<BankAccountId> {
        if let Some(account) = self.venue_accounts.get(&line.venue_id) {
            return Some(*account);
        }
        if flags.offerer_bank_fallback {
            return self.offerer_accounts.get(&line.offerer_id).copied();
        }
        None
    }
}

/// Groups validated pricings into one cashflow per bank account.
///
/// Lines that cannot be mapped to a bank account are returned in the
/// deferred list rather than failing the batch. Every input line ends up
/// in exactly one place, so the cashflow totals plus the deferred amounts
/// always add up to the input total.
///
/// # Errors
///
/// Returns an error when the input itself is inconsistent (duplicate or
/// negative lines); the whole batch is then aborted.
pub fn aggregate(
    lines: &[PricingLine],
    banks: &BankDirectory,
    flags: &FlagSnapshot,
) -> Result<Aggregation, CashflowError> {
    let mut seen = HashSet::with_capacity(lines.len());
    // BTreeMap keeps the per-account output ordered by bank account id.
    let mut groups: BTreeMap<BankAccountId, CashflowDraft> = BTreeMap::new();
    let mut deferred = Vec::new();

    for line in lines {
        if !seen.insert(line.pricing_id) {
            return Err(CashflowError::DuplicatePricing {
                pricing_id: line.pricing_id,
            });
        }
        if line.amount < Decimal::ZERO {
            return Err(CashflowError::NegativeAmount {
                pricing_id: line.pricing_id,
            });
        }

        match banks.account_for(line, flags) {
            Some(bank_account_id) => {
                let draft = groups.entry(bank_account_id).or_insert_with(|| CashflowDraft {
                    bank_account_id,
                    amount: Decimal::ZERO,
                    pricing_ids: Vec::new(),
                });
                draft.amount += line.amount;
                draft.pricing_ids.push(line.pricing_id);
            }
            None => deferred.push(DeferredPricing {
                pricing_id: line.pricing_id,
                venue_id: line.venue_id,
                amount: line.amount,
            }),
        }
    }

    Ok(Aggregation {
        cashflows: groups.into_values().collect(),
        deferred,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use cachet_shared::types::PricingId;

    fn line(venue_id: VenueId, amount: Decimal) -> PricingLine {
        PricingLine {
            pricing_id: PricingId::new(),
            venue_id,
            offerer_id: OffererId::new(),
            amount,
        }
    }

    fn directory_with_venue(venue_id: VenueId) -> (BankDirectory, BankAccountId) {
        let account = BankAccountId::new();
        let directory = BankDirectory::new(
            HashMap::from([(venue_id, account)]),
            HashMap::new(),
        );
        (directory, account)
    }

    #[test]
    fn test_same_account_lines_merge_into_one_cashflow() {
        let venue = VenueId::new();
        let (banks, account) = directory_with_venue(venue);
        let lines = vec![line(venue, dec!(21.85)), line(venue, dec!(9.50))];

        let result = aggregate(&lines, &banks, &FlagSnapshot::default()).unwrap();

        assert_eq!(result.cashflows.len(), 1);
        assert_eq!(result.cashflows[0].bank_account_id, account);
        assert_eq!(result.cashflows[0].amount, dec!(31.35));
        assert_eq!(
            result.cashflows[0].pricing_ids,
            vec![lines[0].pricing_id, lines[1].pricing_id]
        );
        assert!(result.deferred.is_empty());
    }

    #[test]
    fn test_unmapped_venue_defers_instead_of_failing() {
        let mapped = VenueId::new();
        let (banks, _) = directory_with_venue(mapped);
        let orphan = line(VenueId::new(), dec!(12.00));
        let lines = vec![line(mapped, dec!(5.00)), orphan.clone()];

        let result = aggregate(&lines, &banks, &FlagSnapshot::default()).unwrap();

        assert_eq!(result.cashflows.len(), 1);
        assert_eq!(result.deferred.len(), 1);
        assert_eq!(result.deferred[0].pricing_id, orphan.pricing_id);
        assert_eq!(result.deferred[0].amount, dec!(12.00));
    }

    #[test]
    fn test_offerer_fallback_requires_the_flag() {
        let offerer = OffererId::new();
        let account = BankAccountId::new();
        let banks = BankDirectory::new(HashMap::new(), HashMap::from([(offerer, account)]));
        let mut pricing_line = line(VenueId::new(), dec!(7.00));
        pricing_line.offerer_id = offerer;
        let lines = vec![pricing_line];

        // Flag off: deferred.
        let result = aggregate(&lines, &banks, &FlagSnapshot::default()).unwrap();
        assert!(result.cashflows.is_empty());
        assert_eq!(result.deferred.len(), 1);

        // Flag on: paid through the offerer account.
        let flags = FlagSnapshot {
            offerer_bank_fallback: true,
            ..FlagSnapshot::default()
        };
        let result = aggregate(&lines, &banks, &flags).unwrap();
        assert_eq!(result.cashflows.len(), 1);
        assert_eq!(result.cashflows[0].bank_account_id, account);
        assert!(result.deferred.is_empty());
    }

    #[test]
    fn test_venue_link_wins_over_offerer_fallback() {
        let venue = VenueId::new();
        let offerer = OffererId::new();
        let venue_account = BankAccountId::new();
        let offerer_account = BankAccountId::new();
        let banks = BankDirectory::new(
            HashMap::from([(venue, venue_account)]),
            HashMap::from([(offerer, offerer_account)]),
        );
        let mut pricing_line = line(venue, dec!(7.00));
        pricing_line.offerer_id = offerer;

        let flags = FlagSnapshot {
            offerer_bank_fallback: true,
            ..FlagSnapshot::default()
        };
        let result = aggregate(&[pricing_line], &banks, &flags).unwrap();
        assert_eq!(result.cashflows[0].bank_account_id, venue_account);
    }

    #[test]
    fn test_duplicate_pricing_aborts_the_batch() {
        let venue = VenueId::new();
        let (banks, _) = directory_with_venue(venue);
        let duplicated = line(venue, dec!(5.00));
        let lines = vec![duplicated.clone(), duplicated];

        let err = aggregate(&lines, &banks, &FlagSnapshot::default()).unwrap_err();
        assert!(matches!(err, CashflowError::DuplicatePricing { .. }));
    }

    #[test]
    fn test_negative_amount_aborts_the_batch() {
        let venue = VenueId::new();
        let (banks, _) = directory_with_venue(venue);
        let lines = vec![line(venue, dec!(-1.00))];

        let err = aggregate(&lines, &banks, &FlagSnapshot::default()).unwrap_err();
        assert!(matches!(err, CashflowError::NegativeAmount { .. }));
    }

    #[test]
    fn test_zero_amount_line_is_kept() {
        // Zero-amount pricings (fully discounted bookings) still travel
        // through the batch so the event reaches PRICED.
        let venue = VenueId::new();
        let (banks, _) = directory_with_venue(venue);
        let lines = vec![line(venue, dec!(0.00))];

        let result = aggregate(&lines, &banks, &FlagSnapshot::default()).unwrap();
        assert_eq!(result.cashflows.len(), 1);
        assert_eq!(result.cashflows[0].amount, dec!(0.00));
    }

    #[test]
    fn test_empty_input_yields_empty_aggregation() {
        let result = aggregate(&[], &BankDirectory::default(), &FlagSnapshot::default()).unwrap();
        assert!(result.cashflows.is_empty());
        assert!(result.deferred.is_empty());
        assert_eq!(result.total_amount(), Decimal::ZERO);
    }
}
