//! Invoice repository for database operations.
//!
//! Reference allocation locks the scheme row FOR UPDATE so two
//! concurrent invoice runs can never hand out the same reference.

use rust_decimal::Decimal;
use sea_orm::sea_query::{LockBehavior, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use uuid::Uuid;

use cachet_core::invoice::{InvoiceError, ReferenceScheme};
use cachet_shared::types::{BankAccountId, InvoiceId};

use crate::entities::{invoices, reference_schemes};

/// Error types for invoice storage operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceStoreError {
    /// No scheme row exists for the prefix.
    #[error("Reference scheme not found for prefix {0}")]
    SchemeNotFound(String),

    /// Allocation failed (year moved backwards, sequence exhausted).
    #[error(transparent)]
    Allocation(#[from] InvoiceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository;

impl InvoiceRepository {
    /// Ensures a scheme row exists for the prefix, creating it at
    /// sequence 1 when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn ensure_scheme<C: ConnectionTrait>(
        conn: &C,
        prefix: &str,
        year: i32,
    ) -> Result<(), InvoiceStoreError> {
        let existing = reference_schemes::Entity::find()
            .filter(reference_schemes::Column::Prefix.eq(prefix))
            .one(conn)
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        let scheme = reference_schemes::ActiveModel {
            id: Set(Uuid::new_v4()),
            prefix: Set(prefix.to_string()),
            year: Set(year),
            next_number: Set(1),
            updated_at: Set(chrono::Utc::now().into()),
        };
        scheme.insert(conn).await?;
        Ok(())
    }

    /// Allocates the next reference for `year`, advancing the persisted
    /// scheme. Must run inside the transaction that inserts the invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheme is missing, allocation fails, or a
    /// query fails.
    pub async fn allocate_reference<C: ConnectionTrait>(
        conn: &C,
        prefix: &str,
        year: i32,
    ) -> Result<String, InvoiceStoreError> {
        let row = reference_schemes::Entity::find()
            .filter(reference_schemes::Column::Prefix.eq(prefix))
            .lock_with_behavior(LockType::Update, LockBehavior::Nowait)
            .one(conn)
            .await?
            .ok_or_else(|| InvoiceStoreError::SchemeNotFound(prefix.to_string()))?;

        let next_number = u64::try_from(row.next_number).unwrap_or(1).max(1);
        let mut scheme = ReferenceScheme {
            prefix: row.prefix.clone(),
            year: row.year,
            next_number,
        };
        let reference = scheme.allocate(year)?;

        let mut active: reference_schemes::ActiveModel = row.into();
        active.year = Set(scheme.year);
        active.next_number = Set(i64::try_from(scheme.next_number).unwrap_or(i64::MAX));
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(conn).await?;

        Ok(reference)
    }

    /// Inserts an invoice row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        reference: &str,
        bank_account_id: BankAccountId,
        amount: Decimal,
    ) -> Result<invoices::Model, InvoiceStoreError> {
        let invoice = invoices::ActiveModel {
            id: Set(InvoiceId::new().into_inner()),
            reference: Set(reference.to_string()),
            bank_account_id: Set(bank_account_id.into_inner()),
            amount: Set(amount),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(invoice.insert(conn).await?)
    }
}
