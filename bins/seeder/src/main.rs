//! Database seeder for Cachet development and testing.
//!
//! Seeds a standard rule set, a couple of bookings with finance events,
//! and a bank account wired to the bookings' venue, so a local pricing
//! run has something to chew on.
//!
//! Usage: cargo run --bin seeder

use chrono::NaiveDate;
use rust_decimal::Decimal;

use cachet_core::booking::{BookingSnapshot, BookingStatus};
use cachet_core::rules::{RuleFormula, RuleScope};
use cachet_db::repositories::rule::CreateRuleInput;
use cachet_db::repositories::{
    BankAccountRepository, BookingRepository, FinanceEventRepository, RuleRepository,
};
use cachet_shared::types::{BankAccountId, BookingId, OfferId, OffererId, VenueId};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = cachet_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding reimbursement rules...");
    let rules = RuleRepository::new(db.clone());
    let jan_first = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");

    rules
        .create(CreateRuleInput {
            label: "Standard 95%".to_string(),
            formula: RuleFormula::Rate(Decimal::new(95, 2)),
            scope: RuleScope::Standard { subcategory: None },
            valid_from: jan_first,
            valid_until: None,
        })
        .await
        .expect("Failed to seed standard rule");
    rules
        .create(CreateRuleInput {
            label: "Remboursement total livres".to_string(),
            formula: RuleFormula::Rate(Decimal::ONE),
            scope: RuleScope::Standard {
                subcategory: Some("LIVRE_PAPIER".to_string()),
            },
            valid_from: jan_first,
            valid_until: None,
        })
        .await
        .expect("Failed to seed book rule");

    println!("Seeding bookings and finance events...");
    let offerer_id = OffererId::new();
    let venue_id = VenueId::new();
    let used_date = NaiveDate::from_ymd_opt(2024, 3, 10).expect("valid date");

    for (amount, subcategory) in [
        (Decimal::new(2300, 2), Some("LIVRE_PAPIER".to_string())),
        (Decimal::new(1550, 2), Some("CINEMA".to_string())),
    ] {
        let booking = BookingSnapshot {
            id: BookingId::new(),
            offer_id: OfferId::new(),
            offerer_id,
            venue_id,
            subcategory,
            amount,
            quantity: 1,
            status: BookingStatus::Used,
            used_date: Some(used_date),
        };
        BookingRepository::insert(&db, &booking)
            .await
            .expect("Failed to seed booking");
        FinanceEventRepository::create(&db, booking.id, used_date)
            .await
            .expect("Failed to seed finance event");
    }

    println!("Seeding bank account...");
    let account = BankAccountRepository::create(
        &db,
        offerer_id,
        "Librairie du Centre",
        "FR7630006000011234567890189",
    )
    .await
    .expect("Failed to seed bank account");
    BankAccountRepository::link_venue(
        &db,
        venue_id,
        BankAccountId::from_uuid(account.id),
        jan_first,
    )
    .await
    .expect("Failed to link venue");

    println!("Seeding complete!");
}
