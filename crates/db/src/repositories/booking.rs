//! Booking repository for database operations.

use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set};
use uuid::Uuid;

use cachet_core::booking::{BookingSnapshot, BookingStatus};
use cachet_shared::types::{BookingId, OfferId, OffererId, VenueId};

use crate::entities::bookings;
use crate::entities::sea_orm_active_enums::BookingStatus as DbBookingStatus;

/// Error types for booking operations.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Booking not found.
    #[error("Booking not found: {0}")]
    NotFound(Uuid),

    /// A stored row cannot be mapped to a snapshot.
    #[error("Booking {id} is malformed: {reason}")]
    Malformed {
        /// The offending row.
        id: Uuid,
        /// What is wrong with it.
        reason: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Booking repository.
///
/// Bookings are written by the sync from the commercial system; the
/// pricing pipeline only reads them (plus test/seed inserts).
#[derive(Debug, Clone)]
pub struct BookingRepository;

impl BookingRepository {
    /// Loads a booking as a pricing snapshot.
    ///
    /// Takes any connection so it can run inside a claim transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is missing, malformed, or the
    /// query fails.
    pub async fn snapshot<C: ConnectionTrait>(
        conn: &C,
        booking_id: Uuid,
    ) -> Result<BookingSnapshot, BookingError> {
        let row = bookings::Entity::find_by_id(booking_id)
            .one(conn)
            .await?
            .ok_or(BookingError::NotFound(booking_id))?;
        to_snapshot(row)
    }

    /// Inserts a booking row. Used by the seeder and tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        snapshot: &BookingSnapshot,
    ) -> Result<bookings::Model, BookingError> {
        let now = chrono::Utc::now().into();
        let row = bookings::ActiveModel {
            id: Set(snapshot.id.into_inner()),
            offer_id: Set(snapshot.offer_id.into_inner()),
            offerer_id: Set(snapshot.offerer_id.into_inner()),
            venue_id: Set(snapshot.venue_id.into_inner()),
            subcategory: Set(snapshot.subcategory.clone()),
            amount: Set(snapshot.amount),
            quantity: Set(i32::try_from(snapshot.quantity).map_err(|_| {
                BookingError::Malformed {
                    id: snapshot.id.into_inner(),
                    reason: "quantity out of range".to_string(),
                }
            })?),
            status: Set(to_db_status(snapshot.status)),
            used_date: Set(snapshot.used_date),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(row.insert(conn).await?)
    }
}

fn to_snapshot(row: bookings::Model) -> Result<BookingSnapshot, BookingError> {
    let quantity = u32::try_from(row.quantity).map_err(|_| BookingError::Malformed {
        id: row.id,
        reason: "negative quantity".to_string(),
    })?;

    Ok(BookingSnapshot {
        id: BookingId::from_uuid(row.id),
        offer_id: OfferId::from_uuid(row.offer_id),
        offerer_id: OffererId::from_uuid(row.offerer_id),
        venue_id: VenueId::from_uuid(row.venue_id),
        subcategory: row.subcategory,
        amount: row.amount,
        quantity,
        status: from_db_status(&row.status),
        used_date: row.used_date,
    })
}

fn to_db_status(status: BookingStatus) -> DbBookingStatus {
    match status {
        BookingStatus::Pending => DbBookingStatus::Pending,
        BookingStatus::Confirmed => DbBookingStatus::Confirmed,
        BookingStatus::Used => DbBookingStatus::Used,
        BookingStatus::Cancelled => DbBookingStatus::Cancelled,
        BookingStatus::Reimbursed => DbBookingStatus::Reimbursed,
    }
}

fn from_db_status(status: &DbBookingStatus) -> BookingStatus {
    match status {
        DbBookingStatus::Pending => BookingStatus::Pending,
        DbBookingStatus::Confirmed => BookingStatus::Confirmed,
        DbBookingStatus::Used => BookingStatus::Used,
        DbBookingStatus::Cancelled => BookingStatus::Cancelled,
        DbBookingStatus::Reimbursed => BookingStatus::Reimbursed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_maps_to_snapshot() {
        let row = bookings::Model {
            id: Uuid::new_v4(),
            offer_id: Uuid::new_v4(),
            offerer_id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            subcategory: Some("LIVRE_PAPIER".to_string()),
            amount: dec!(23.00),
            quantity: 2,
            status: DbBookingStatus::Used,
            used_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        };
        let snapshot = to_snapshot(row).unwrap();
        assert_eq!(snapshot.status, BookingStatus::Used);
        assert_eq!(snapshot.total_amount(), dec!(46.00));
        assert!(snapshot.is_priceable());
    }

    #[test]
    fn test_negative_quantity_is_malformed() {
        let row = bookings::Model {
            id: Uuid::new_v4(),
            offer_id: Uuid::new_v4(),
            offerer_id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            subcategory: None,
            amount: dec!(23.00),
            quantity: -1,
            status: DbBookingStatus::Used,
            used_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        };
        assert!(matches!(
            to_snapshot(row),
            Err(BookingError::Malformed { .. })
        ));
    }
}
