//! Cashflow repository for database operations.

use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use cachet_core::cashflow::CashflowDraft;
use cachet_shared::types::{CashflowBatchId, CashflowId};

use crate::entities::sea_orm_active_enums::CashflowStatus as DbCashflowStatus;
use crate::entities::{cashflow_batches, cashflows};

/// Error types for cashflow storage operations.
#[derive(Debug, thiserror::Error)]
pub enum CashflowStoreError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Cashflow repository.
#[derive(Debug, Clone)]
pub struct CashflowRepository;

impl CashflowRepository {
    /// Returns the batch row for a period label, if it was already
    /// generated.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_batch<C: ConnectionTrait>(
        conn: &C,
        label: &str,
    ) -> Result<Option<cashflow_batches::Model>, CashflowStoreError> {
        let batch = cashflow_batches::Entity::find()
            .filter(cashflow_batches::Column::Label.eq(label))
            .one(conn)
            .await?;
        Ok(batch)
    }

    /// Creates the batch row for a period.
    ///
    /// The unique label constraint rejects a concurrent second run of the
    /// same period.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_batch<C: ConnectionTrait>(
        conn: &C,
        label: &str,
        cutoff: chrono::NaiveDate,
    ) -> Result<cashflow_batches::Model, CashflowStoreError> {
        let batch = cashflow_batches::ActiveModel {
            id: Set(CashflowBatchId::new().into_inner()),
            label: Set(label.to_string()),
            cutoff: Set(cutoff),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(batch.insert(conn).await?)
    }

    /// Inserts one cashflow row for a draft, returning its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_draft<C: ConnectionTrait>(
        conn: &C,
        batch_id: CashflowBatchId,
        draft: &CashflowDraft,
    ) -> Result<CashflowId, CashflowStoreError> {
        let id = CashflowId::new();
        let now = chrono::Utc::now().into();
        let row = cashflows::ActiveModel {
            id: Set(id.into_inner()),
            batch_id: Set(batch_id.into_inner()),
            bank_account_id: Set(draft.bank_account_id.into_inner()),
            amount: Set(draft.amount),
            status: Set(DbCashflowStatus::Pending),
            invoice_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        row.insert(conn).await?;
        Ok(id)
    }

    /// Returns the cashflows of a batch, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn for_batch<C: ConnectionTrait>(
        conn: &C,
        batch_id: CashflowBatchId,
    ) -> Result<Vec<cashflows::Model>, CashflowStoreError> {
        let rows = cashflows::Entity::find()
            .filter(cashflows::Column::BatchId.eq(batch_id.into_inner()))
            .order_by_asc(cashflows::Column::CreatedAt)
            .order_by_asc(cashflows::Column::Id)
            .all(conn)
            .await?;
        Ok(rows)
    }

    /// Returns the unbilled cashflows of a batch, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn unbilled_for_batch<C: ConnectionTrait>(
        conn: &C,
        batch_id: CashflowBatchId,
    ) -> Result<Vec<cashflows::Model>, CashflowStoreError> {
        let rows = cashflows::Entity::find()
            .filter(cashflows::Column::BatchId.eq(batch_id.into_inner()))
            .filter(cashflows::Column::InvoiceId.is_null())
            .order_by_asc(cashflows::Column::CreatedAt)
            .order_by_asc(cashflows::Column::Id)
            .all(conn)
            .await?;
        Ok(rows)
    }

    /// Attaches cashflows to an invoice and moves them UNDER_REVIEW.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn attach_to_invoice<C: ConnectionTrait>(
        conn: &C,
        cashflow_ids: &[Uuid],
        invoice_id: Uuid,
    ) -> Result<u64, CashflowStoreError> {
        use sea_orm::sea_query::Expr;

        let result = cashflows::Entity::update_many()
            .col_expr(
                cashflows::Column::Status,
                DbCashflowStatus::UnderReview.as_enum(),
            )
            .col_expr(cashflows::Column::InvoiceId, Expr::value(invoice_id))
            .col_expr(cashflows::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(cashflows::Column::Id.is_in(cashflow_ids.iter().copied()))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
