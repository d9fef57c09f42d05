//! Pricing repository for database operations.
//!
//! Pricing rows are append-only: a correction cancels the prior row and
//! inserts a new one in the same transaction, so history is never
//! rewritten.

use chrono::NaiveDate;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use cachet_core::cashflow::PricingLine;
use cachet_core::pricing::{PricingOutcome, PricingSnapshot, PricingStatus};
use cachet_shared::types::{
    BookingId, CashflowId, FinanceEventId, OffererId, PricingId, RuleId, VenueId,
};

use crate::entities::sea_orm_active_enums::PricingStatus as DbPricingStatus;
use crate::entities::{bookings, finance_events, pricings};

/// Error types for pricing storage operations.
#[derive(Debug, thiserror::Error)]
pub enum PricingStoreError {
    /// Pricing not found.
    #[error("Pricing not found: {0}")]
    NotFound(Uuid),

    /// The outcome references a prior pricing that is no longer live.
    #[error("Prior pricing {0} was modified concurrently")]
    PriorChanged(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug, FromQueryResult)]
struct PricingLineRow {
    id: Uuid,
    venue_id: Uuid,
    amount: rust_decimal::Decimal,
    offerer_id: Uuid,
}

/// Pricing repository.
#[derive(Debug, Clone)]
pub struct PricingRepository;

impl PricingRepository {
    /// Returns the latest live (non-cancelled) pricing for a booking.
    ///
    /// A correction event finds the prior pricing through this lookup,
    /// whatever event produced it.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_live_for_booking<C: ConnectionTrait>(
        conn: &C,
        booking_id: BookingId,
    ) -> Result<Option<PricingSnapshot>, PricingStoreError> {
        let row = pricings::Entity::find()
            .filter(pricings::Column::BookingId.eq(booking_id.into_inner()))
            .filter(pricings::Column::Status.ne(DbPricingStatus::Cancelled))
            .order_by_desc(pricings::Column::CreatedAt)
            .one(conn)
            .await?;
        Ok(row.map(|row| to_snapshot(&row)))
    }

    /// Persists a pricing outcome: cancels the prior row (when the
    /// outcome is a correction) and inserts the draft as VALIDATED.
    ///
    /// Must run inside the same transaction as the event status change.
    ///
    /// # Errors
    ///
    /// Returns an error if the prior row disappeared or an update fails.
    pub async fn apply_outcome<C: ConnectionTrait>(
        conn: &C,
        outcome: &PricingOutcome,
    ) -> Result<pricings::Model, PricingStoreError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        if let Some(prior_id) = outcome.cancel_prior {
            let prior = pricings::Entity::find_by_id(prior_id.into_inner())
                .one(conn)
                .await?
                .ok_or(PricingStoreError::NotFound(prior_id.into_inner()))?;
            if prior.status == DbPricingStatus::Cancelled {
                return Err(PricingStoreError::PriorChanged(prior_id.into_inner()));
            }

            let mut active: pricings::ActiveModel = prior.into();
            active.status = Set(DbPricingStatus::Cancelled);
            active.updated_at = Set(now);
            active.update(conn).await?;
        }

        let draft = &outcome.draft;
        let row = pricings::ActiveModel {
            id: Set(PricingId::new().into_inner()),
            event_id: Set(draft.event_id.into_inner()),
            booking_id: Set(draft.booking_id.into_inner()),
            venue_id: Set(draft.venue_id.into_inner()),
            rule_id: Set(draft.rule_id.into_inner()),
            amount: Set(draft.amount),
            pricing_date: Set(draft.pricing_date),
            status: Set(DbPricingStatus::Validated),
            parent_pricing_id: Set(draft.parent_pricing_id.map(PricingId::into_inner)),
            cashflow_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(row.insert(conn).await?)
    }

    /// Loads the batchable pricing lines for a cashflow run: VALIDATED,
    /// not yet attached to a cashflow, priced on or before the cutoff.
    ///
    /// Joined to bookings for the offerer, which the bank fallback needs.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn batchable_lines<C: ConnectionTrait>(
        conn: &C,
        cutoff: NaiveDate,
    ) -> Result<Vec<PricingLine>, PricingStoreError> {
        let rows = pricings::Entity::find()
            .select_only()
            .column(pricings::Column::Id)
            .column(pricings::Column::VenueId)
            .column(pricings::Column::Amount)
            .column(bookings::Column::OffererId)
            .join(JoinType::InnerJoin, pricings::Relation::FinanceEvents.def())
            .join(
                JoinType::InnerJoin,
                finance_events::Relation::Bookings.def(),
            )
            .filter(pricings::Column::Status.eq(DbPricingStatus::Validated))
            .filter(pricings::Column::CashflowId.is_null())
            .filter(pricings::Column::PricingDate.lte(cutoff))
            .order_by_asc(pricings::Column::PricingDate)
            .order_by_asc(pricings::Column::Id)
            .into_model::<PricingLineRow>()
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| PricingLine {
                pricing_id: PricingId::from_uuid(row.id),
                venue_id: VenueId::from_uuid(row.venue_id),
                offerer_id: OffererId::from_uuid(row.offerer_id),
                amount: row.amount,
            })
            .collect())
    }

    /// Counts the pricings attached to a set of cashflows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_for_cashflows<C: ConnectionTrait>(
        conn: &C,
        cashflow_ids: &[Uuid],
    ) -> Result<u64, PricingStoreError> {
        use sea_orm::PaginatorTrait;

        let count = pricings::Entity::find()
            .filter(pricings::Column::CashflowId.is_in(cashflow_ids.iter().copied()))
            .count(conn)
            .await?;
        Ok(count)
    }

    /// Attaches a set of pricings to a cashflow and marks them PROCESSED.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn attach_to_cashflow<C: ConnectionTrait>(
        conn: &C,
        pricing_ids: &[PricingId],
        cashflow_id: CashflowId,
    ) -> Result<u64, PricingStoreError> {
        use sea_orm::sea_query::Expr;

        let ids: Vec<Uuid> = pricing_ids.iter().map(|id| id.into_inner()).collect();
        let result = pricings::Entity::update_many()
            .col_expr(
                pricings::Column::Status,
                DbPricingStatus::Processed.as_enum(),
            )
            .col_expr(
                pricings::Column::CashflowId,
                Expr::value(cashflow_id.into_inner()),
            )
            .col_expr(pricings::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(pricings::Column::Id.is_in(ids))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}

fn to_snapshot(row: &pricings::Model) -> PricingSnapshot {
    PricingSnapshot {
        id: PricingId::from_uuid(row.id),
        event_id: FinanceEventId::from_uuid(row.event_id),
        booking_id: BookingId::from_uuid(row.booking_id),
        venue_id: VenueId::from_uuid(row.venue_id),
        rule_id: RuleId::from_uuid(row.rule_id),
        amount: row.amount,
        pricing_date: row.pricing_date,
        status: match row.status {
            DbPricingStatus::Validated => PricingStatus::Validated,
            DbPricingStatus::Cancelled => PricingStatus::Cancelled,
            DbPricingStatus::Processed => PricingStatus::Processed,
        },
        parent_pricing_id: row.parent_pricing_id.map(PricingId::from_uuid),
    }
}
