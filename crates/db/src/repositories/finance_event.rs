//! Finance event repository for database operations.

use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, LockBehavior, LockType};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use cachet_core::pricing::{validate_transition, FinanceEventSnapshot, FinanceEventStatus};
use cachet_core::pricing::PricingError;
use cachet_shared::types::{BookingId, FinanceEventId};

use crate::entities::finance_events;
use crate::entities::sea_orm_active_enums::FinanceEventStatus as DbEventStatus;

/// Error types for finance event operations.
#[derive(Debug, thiserror::Error)]
pub enum FinanceEventError {
    /// Event not found.
    #[error("Finance event not found: {0}")]
    NotFound(Uuid),

    /// The requested status change is illegal.
    #[error(transparent)]
    Transition(#[from] PricingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Finance event repository.
#[derive(Debug, Clone)]
pub struct FinanceEventRepository;

impl FinanceEventRepository {
    /// Creates a PENDING event for a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        booking_id: BookingId,
        value_date: NaiveDate,
    ) -> Result<finance_events::Model, FinanceEventError> {
        let now = chrono::Utc::now().into();
        let event = finance_events::ActiveModel {
            id: Set(FinanceEventId::new().into_inner()),
            booking_id: Set(booking_id.into_inner()),
            status: Set(DbEventStatus::Pending),
            value_date: Set(value_date),
            review_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(event.insert(conn).await?)
    }

    /// Claims a page of workable events for a pricing run.
    ///
    /// Uses `FOR UPDATE SKIP LOCKED` so concurrent workers never process
    /// the same event twice; rows locked by another worker are simply
    /// skipped. Must run inside a transaction, and events parked for
    /// review are left alone.
    ///
    /// Pages are keyed on the event id (time-ordered), `after` being the
    /// last id of the previous page. An event the run deferred is not
    /// claimed again within the same run.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn claim_page<C: ConnectionTrait>(
        conn: &C,
        cutoff: NaiveDate,
        after: Option<Uuid>,
        limit: u64,
    ) -> Result<Vec<finance_events::Model>, FinanceEventError> {
        let mut query = finance_events::Entity::find()
            .filter(
                finance_events::Column::Status
                    .is_in([DbEventStatus::Pending, DbEventStatus::Ready]),
            )
            .filter(finance_events::Column::ValueDate.lte(cutoff))
            .filter(finance_events::Column::ReviewReason.is_null());
        if let Some(after) = after {
            query = query.filter(finance_events::Column::Id.gt(after));
        }
        let events = query
            .order_by_asc(finance_events::Column::Id)
            .limit(limit)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .all(conn)
            .await?;
        Ok(events)
    }

    /// Moves an event to a new status, enforcing the transition rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is missing, the transition is
    /// illegal, or the update fails.
    pub async fn transition<C: ConnectionTrait>(
        conn: &C,
        event: finance_events::Model,
        to: FinanceEventStatus,
    ) -> Result<finance_events::Model, FinanceEventError> {
        validate_transition(from_db_status(&event.status), to)?;

        let mut active: finance_events::ActiveModel = event.into();
        active.status = Set(to_db_status(to));
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(conn).await?)
    }

    /// Parks an event for manual review, recording why.
    ///
    /// The event keeps its status; the review reason takes it out of
    /// every future claim until an operator clears it.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn park_for_review<C: ConnectionTrait>(
        conn: &C,
        event: finance_events::Model,
        reason: &str,
    ) -> Result<finance_events::Model, FinanceEventError> {
        let mut active: finance_events::ActiveModel = event.into();
        active.review_reason = Set(Some(reason.to_string()));
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(conn).await?)
    }

    /// Clears the review reason so the event is claimable again.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is missing or the update fails.
    pub async fn release_from_review<C: ConnectionTrait>(
        conn: &C,
        event_id: Uuid,
    ) -> Result<finance_events::Model, FinanceEventError> {
        let event = finance_events::Entity::find_by_id(event_id)
            .one(conn)
            .await?
            .ok_or(FinanceEventError::NotFound(event_id))?;

        let mut active: finance_events::ActiveModel = event.into();
        active.review_reason = Set(None);
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(conn).await?)
    }

    /// Cancels every live event of a booking (booking cancelled upstream).
    ///
    /// PRICED events are left untouched: those need a correction event,
    /// not a cancellation.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn cancel_for_booking<C: ConnectionTrait>(
        conn: &C,
        booking_id: BookingId,
    ) -> Result<u64, FinanceEventError> {
        let result = finance_events::Entity::update_many()
            .col_expr(
                finance_events::Column::Status,
                DbEventStatus::Cancelled.as_enum(),
            )
            .col_expr(
                finance_events::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(finance_events::Column::BookingId.eq(booking_id.into_inner()))
            .filter(
                finance_events::Column::Status
                    .is_in([DbEventStatus::Pending, DbEventStatus::Ready]),
            )
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}

/// Maps a row to the core snapshot handed to the calculator.
#[must_use]
pub fn to_snapshot(row: &finance_events::Model) -> FinanceEventSnapshot {
    FinanceEventSnapshot {
        id: FinanceEventId::from_uuid(row.id),
        booking_id: BookingId::from_uuid(row.booking_id),
        status: from_db_status(&row.status),
        value_date: row.value_date,
    }
}

pub(crate) fn to_db_status(status: FinanceEventStatus) -> DbEventStatus {
    match status {
        FinanceEventStatus::Pending => DbEventStatus::Pending,
        FinanceEventStatus::Ready => DbEventStatus::Ready,
        FinanceEventStatus::Priced => DbEventStatus::Priced,
        FinanceEventStatus::Cancelled => DbEventStatus::Cancelled,
    }
}

pub(crate) fn from_db_status(status: &DbEventStatus) -> FinanceEventStatus {
    match status {
        DbEventStatus::Pending => FinanceEventStatus::Pending,
        DbEventStatus::Ready => FinanceEventStatus::Ready,
        DbEventStatus::Priced => FinanceEventStatus::Priced,
        DbEventStatus::Cancelled => FinanceEventStatus::Cancelled,
    }
}
