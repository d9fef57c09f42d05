//! The cashflow run: folds validated pricings into one batch of payment
//! instructions.

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, warn};

use cachet_core::cashflow::aggregate;
use cachet_shared::types::BatchPeriod;

use crate::jobs::JobError;
use crate::repositories::{
    BankAccountRepository, CashflowRepository, FlagRepository, PricingRepository,
};

/// Counters for one cashflow run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateCashflowsReport {
    /// Cashflows written.
    pub cashflows: u64,
    /// Pricings attached to a cashflow.
    pub pricings: u64,
    /// Pricings deferred to the next batch (no bank account).
    pub deferred: u64,
    /// Total amount of the batch.
    pub total: Decimal,
}

/// Generates the cashflow batch for a settlement period.
///
/// The whole batch is one transaction: either every cashflow is written
/// and its pricings marked PROCESSED, or nothing is. Re-running an
/// already generated period writes nothing and reports the prior batch;
/// pricings deferred for a missing bank account stay VALIDATED and are
/// picked up by the next period automatically.
///
/// # Errors
///
/// Returns an error if the aggregator rejects the input or a query
/// fails.
pub async fn run(
    db: &DatabaseConnection,
    period: &BatchPeriod,
) -> Result<GenerateCashflowsReport, JobError> {
    let cutoff = period.cutoff();
    info!(label = %period.label, %cutoff, "starting cashflow run");

    if let Some(batch) = CashflowRepository::find_batch(db, &period.label).await? {
        return replay(db, period, &batch).await;
    }

    let txn = db.begin().await.map_err(JobError::Database)?;

    // Two runs racing past the check above collide on the unique batch
    // label here; the loser aborts and the scheduler retries.
    let batch = CashflowRepository::create_batch(&txn, &period.label, cutoff).await?;
    let flags = FlagRepository::snapshot(&txn).await?;
    let banks = BankAccountRepository::directory(&txn, cutoff)
        .await
        .map_err(JobError::Database)?;
    let lines = PricingRepository::batchable_lines(&txn, cutoff).await?;

    let aggregation = aggregate(&lines, &banks, &flags)?;

    let mut report = GenerateCashflowsReport {
        total: aggregation.total_amount(),
        ..GenerateCashflowsReport::default()
    };

    let batch_id = cachet_shared::types::CashflowBatchId::from_uuid(batch.id);
    for draft in &aggregation.cashflows {
        let cashflow_id = CashflowRepository::insert_draft(&txn, batch_id, draft).await?;
        PricingRepository::attach_to_cashflow(&txn, &draft.pricing_ids, cashflow_id).await?;
        report.cashflows += 1;
        report.pricings += u64::try_from(draft.pricing_ids.len()).unwrap_or(u64::MAX);
    }

    for deferral in &aggregation.deferred {
        warn!(
            pricing_id = %deferral.pricing_id,
            venue_id = %deferral.venue_id,
            amount = %deferral.amount,
            "pricing deferred: no bank account for venue"
        );
    }
    report.deferred = u64::try_from(aggregation.deferred.len()).unwrap_or(u64::MAX);

    txn.commit().await.map_err(JobError::Database)?;

    info!(
        label = %period.label,
        cashflows = report.cashflows,
        pricings = report.pricings,
        deferred = report.deferred,
        total = %report.total,
        "cashflow run complete"
    );
    Ok(report)
}

/// Reports the cashflows of an already generated period without writing
/// anything.
async fn replay(
    db: &DatabaseConnection,
    period: &BatchPeriod,
    batch: &crate::entities::cashflow_batches::Model,
) -> Result<GenerateCashflowsReport, JobError> {
    let batch_id = cachet_shared::types::CashflowBatchId::from_uuid(batch.id);
    let rows = CashflowRepository::for_batch(db, batch_id).await?;
    let ids: Vec<uuid::Uuid> = rows.iter().map(|row| row.id).collect();
    let pricings = PricingRepository::count_for_cashflows(db, &ids).await?;

    let report = GenerateCashflowsReport {
        cashflows: u64::try_from(rows.len()).unwrap_or(u64::MAX),
        pricings,
        deferred: 0,
        total: rows.iter().map(|row| row.amount).sum(),
    };
    info!(
        label = %period.label,
        cashflows = report.cashflows,
        total = %report.total,
        "period already generated, reporting prior batch"
    );
    Ok(report)
}
