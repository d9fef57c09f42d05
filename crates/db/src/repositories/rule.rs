//! Reimbursement rule repository for database operations.

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use cachet_core::rules::{ReimbursementRule, RuleError, RuleFormula, RuleScope, RuleSet, Timespan};
use cachet_shared::types::{OfferId, OffererId, RuleId};

use crate::entities::reimbursement_rules;
use crate::entities::sea_orm_active_enums::RuleScopeKind;

/// Error types for rule storage operations.
#[derive(Debug, thiserror::Error)]
pub enum RuleStoreError {
    /// A stored rule row cannot be mapped to a domain rule.
    #[error("Rule {id} is malformed: {reason}")]
    Malformed {
        /// The offending row.
        id: Uuid,
        /// What is wrong with it.
        reason: String,
    },

    /// The stored rules violate a domain invariant (overlap, bad formula).
    #[error(transparent)]
    Invalid(#[from] RuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a reimbursement rule.
#[derive(Debug, Clone)]
pub struct CreateRuleInput {
    pub label: String,
    pub formula: RuleFormula,
    pub scope: RuleScope,
    pub valid_from: NaiveDate,
    pub valid_until: Option<NaiveDate>,
}

/// Rule repository for loading and creating reimbursement rules.
#[derive(Debug, Clone)]
pub struct RuleRepository {
    db: DatabaseConnection,
}

impl RuleRepository {
    /// Creates a new rule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads all rules into a validated [`RuleSet`].
    ///
    /// The whole store is loaded at batch start so one run resolves
    /// against a single consistent snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a row is malformed, the set violates the
    /// non-overlap invariant, or the query fails.
    pub async fn load_rule_set(&self) -> Result<RuleSet, RuleStoreError> {
        let rows = reimbursement_rules::Entity::find()
            .order_by_asc(reimbursement_rules::Column::ValidFrom)
            .all(&self.db)
            .await?;

        let rules = rows
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RuleSet::new(rules)?)
    }

    /// Creates a new rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including the database-side
    /// overlap exclusion constraint).
    pub async fn create(
        &self,
        input: CreateRuleInput,
    ) -> Result<reimbursement_rules::Model, RuleStoreError> {
        let (rate, fixed_amount) = match input.formula {
            RuleFormula::Rate(rate) => (Some(rate), None),
            RuleFormula::FixedAmount(amount) => (None, Some(amount)),
        };
        let (scope_kind, subcategory, offer_id, offerer_id) = match input.scope {
            RuleScope::Standard { subcategory } => {
                (RuleScopeKind::Standard, subcategory, None, None)
            }
            RuleScope::CustomOffer { offer_id } => (
                RuleScopeKind::CustomOffer,
                None,
                Some(offer_id.into_inner()),
                None,
            ),
            RuleScope::CustomOfferer { offerer_id } => (
                RuleScopeKind::CustomOfferer,
                None,
                None,
                Some(offerer_id.into_inner()),
            ),
        };

        let rule = reimbursement_rules::ActiveModel {
            id: Set(RuleId::new().into_inner()),
            label: Set(input.label),
            scope_kind: Set(scope_kind),
            subcategory: Set(subcategory),
            offer_id: Set(offer_id),
            offerer_id: Set(offerer_id),
            rate: Set(rate),
            fixed_amount: Set(fixed_amount),
            valid_from: Set(input.valid_from),
            valid_until: Set(input.valid_until),
            created_at: Set(chrono::Utc::now().into()),
        };

        Ok(rule.insert(&self.db).await?)
    }
}

fn to_domain(row: reimbursement_rules::Model) -> Result<ReimbursementRule, RuleStoreError> {
    let formula = match (row.rate, row.fixed_amount) {
        (Some(rate), None) => RuleFormula::Rate(rate),
        (None, Some(amount)) => RuleFormula::FixedAmount(amount),
        _ => {
            return Err(RuleStoreError::Malformed {
                id: row.id,
                reason: "exactly one of rate / fixed_amount must be set".to_string(),
            });
        }
    };

    let scope = match row.scope_kind {
        RuleScopeKind::Standard => RuleScope::Standard {
            subcategory: row.subcategory,
        },
        RuleScopeKind::CustomOffer => RuleScope::CustomOffer {
            offer_id: OfferId::from_uuid(row.offer_id.ok_or_else(|| {
                RuleStoreError::Malformed {
                    id: row.id,
                    reason: "CUSTOM_OFFER rule without offer_id".to_string(),
                }
            })?),
        },
        RuleScopeKind::CustomOfferer => RuleScope::CustomOfferer {
            offerer_id: OffererId::from_uuid(row.offerer_id.ok_or_else(|| {
                RuleStoreError::Malformed {
                    id: row.id,
                    reason: "CUSTOM_OFFERER rule without offerer_id".to_string(),
                }
            })?),
        },
    };

    Ok(ReimbursementRule {
        id: RuleId::from_uuid(row.id),
        label: row.label,
        formula,
        scope,
        timespan: Timespan::new(row.valid_from, row.valid_until),
    })
}
