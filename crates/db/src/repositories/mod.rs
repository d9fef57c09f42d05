//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. They materialize rows into the core crate's value
//! objects at the boundary; nothing past them sees an entity model.

pub mod bank_account;
pub mod booking;
pub mod cashflow;
pub mod finance_event;
pub mod flag;
pub mod invoice;
pub mod pricing;
pub mod rule;

pub use bank_account::BankAccountRepository;
pub use booking::{BookingError, BookingRepository};
pub use cashflow::{CashflowRepository, CashflowStoreError};
pub use finance_event::{FinanceEventError, FinanceEventRepository};
pub use flag::FlagRepository;
pub use invoice::{InvoiceRepository, InvoiceStoreError};
pub use pricing::{PricingRepository, PricingStoreError};
pub use rule::{RuleRepository, RuleStoreError};
