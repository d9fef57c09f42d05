//! `SeaORM` entity definitions.

pub mod bank_accounts;
pub mod bookings;
pub mod cashflow_batches;
pub mod cashflows;
pub mod feature_flags;
pub mod finance_events;
pub mod invoices;
pub mod pricings;
pub mod reference_schemes;
pub mod reimbursement_rules;
pub mod sea_orm_active_enums;
pub mod venue_bank_links;
