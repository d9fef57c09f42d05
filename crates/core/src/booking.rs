//! Booking value objects.
//!
//! Repositories materialize bookings into these snapshots before handing
//! them to the pricing pipeline; no lazy loading happens past this point.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cachet_shared::types::{BookingId, OfferId, OffererId, VenueId};

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Reserved but not yet confirmed by the user.
    Pending,
    /// Confirmed, waiting to be used.
    Confirmed,
    /// The good or service was delivered; eligible for pricing.
    Used,
    /// Cancelled; never eligible for pricing.
    Cancelled,
    /// Already reimbursed; only corrective incidents may touch it.
    Reimbursed,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Used => "USED",
            Self::Cancelled => "CANCELLED",
            Self::Reimbursed => "REIMBURSED",
        };
        write!(f, "{s}")
    }
}

/// Fully-materialized view of a booking, as needed by the pricing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSnapshot {
    /// Booking identifier.
    pub id: BookingId,
    /// Offer the booking was made against.
    pub offer_id: OfferId,
    /// Offerer (cultural structure) owning the offer.
    pub offerer_id: OffererId,
    /// Venue delivering the good or service.
    pub venue_id: VenueId,
    /// Offer subcategory (e.g. "LIVRE_PAPIER"), when known.
    pub subcategory: Option<String>,
    /// Unit price in euros.
    pub amount: Decimal,
    /// Number of units booked.
    pub quantity: u32,
    /// Current lifecycle status.
    pub status: BookingStatus,
    /// Date the good or service was delivered, once USED.
    pub used_date: Option<NaiveDate>,
}

impl BookingSnapshot {
    /// Total monetary value of the booking (unit amount times quantity).
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.amount * Decimal::from(self.quantity)
    }

    /// Returns true if the booking can be priced (used, not cancelled).
    #[must_use]
    pub fn is_priceable(&self) -> bool {
        matches!(self.status, BookingStatus::Used | BookingStatus::Reimbursed)
            && self.used_date.is_some()
    }
}
