//! The invoicing run: bills the cashflows of one batch.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

use cachet_shared::types::{BankAccountId, BatchPeriod, CashflowBatchId};

use crate::jobs::JobError;
use crate::repositories::{CashflowRepository, InvoiceRepository};

/// Counters for one invoicing run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateInvoicesReport {
    /// Invoices written.
    pub invoices: u64,
    /// Total billed amount.
    pub total: Decimal,
}

/// Bills the unbilled cashflows of a settlement period, one invoice per
/// cashflow (a cashflow is one (batch, bank account) row, so references
/// never mix periods).
///
/// References are allocated from the persisted scheme inside the same
/// transaction as the invoice inserts, so a rollback never burns a
/// number and references stay gapless. Re-running skips already-billed
/// cashflows.
///
/// # Errors
///
/// Returns an error if no batch was generated for the period, reference
/// allocation fails, or a query fails.
pub async fn run(
    db: &DatabaseConnection,
    prefix: &str,
    period: &BatchPeriod,
    today: NaiveDate,
) -> Result<GenerateInvoicesReport, JobError> {
    info!(prefix, label = %period.label, %today, "starting invoicing run");

    let txn = db.begin().await.map_err(JobError::Database)?;

    let batch = CashflowRepository::find_batch(&txn, &period.label)
        .await?
        .ok_or_else(|| JobError::BatchNotFound(period.label.clone()))?;

    InvoiceRepository::ensure_scheme(&txn, prefix, today.year()).await?;
    let unbilled =
        CashflowRepository::unbilled_for_batch(&txn, CashflowBatchId::from_uuid(batch.id)).await?;

    let mut report = GenerateInvoicesReport::default();
    for cashflow in unbilled {
        let reference = InvoiceRepository::allocate_reference(&txn, prefix, today.year()).await?;
        let invoice = InvoiceRepository::insert(
            &txn,
            &reference,
            BankAccountId::from_uuid(cashflow.bank_account_id),
            cashflow.amount,
        )
        .await?;
        CashflowRepository::attach_to_invoice(&txn, &[cashflow.id], invoice.id).await?;

        info!(%reference, amount = %cashflow.amount, "invoice generated");
        report.invoices += 1;
        report.total += cashflow.amount;
    }

    txn.commit().await.map_err(JobError::Database)?;

    info!(
        label = %period.label,
        invoices = report.invoices,
        total = %report.total,
        "invoicing run complete"
    );
    Ok(report)
}
