//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `BookingId` where a `VenueId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(BookingId, "Unique identifier for a booking.");
typed_id!(OfferId, "Unique identifier for an offer.");
typed_id!(OffererId, "Unique identifier for an offerer (cultural structure).");
typed_id!(VenueId, "Unique identifier for a venue.");
typed_id!(RuleId, "Unique identifier for a reimbursement rule.");
typed_id!(FinanceEventId, "Unique identifier for a finance event.");
typed_id!(PricingId, "Unique identifier for a pricing record.");
typed_id!(CashflowBatchId, "Unique identifier for a cashflow batch.");
typed_id!(CashflowId, "Unique identifier for a cashflow.");
typed_id!(InvoiceId, "Unique identifier for an invoice.");
typed_id!(BankAccountId, "Unique identifier for a bank account.");
