//! The pricing run: claims workable finance events and prices them.

use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, warn};

use cachet_core::pricing::{self, FinanceEventStatus};

use crate::jobs::JobError;
use crate::repositories::booking::BookingError;
use crate::repositories::finance_event::{self, FinanceEventRepository};
use crate::repositories::pricing::PricingRepository;
use crate::repositories::{BookingRepository, FlagRepository, RuleRepository};

/// Counters for one pricing run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PriceEventsReport {
    /// Events priced (including corrections).
    pub priced: u64,
    /// Events left for the next run (no applicable rule yet).
    pub deferred: u64,
    /// Events parked for manual review.
    pub parked: u64,
}

/// Prices every workable finance event with a value date on or before
/// `cutoff`.
///
/// Rules and flags are loaded once: the whole run resolves against a
/// single snapshot, even if an operator edits a rule mid-run. Events are
/// claimed page by page with `FOR UPDATE SKIP LOCKED`, one transaction
/// per page, so a crash loses at most one page of work and concurrent
/// workers share the backlog. `max_pages = 0` means no page limit.
///
/// # Errors
///
/// Returns an error on infrastructure failures; per-event problems are
/// routed into the report instead.
pub async fn run(
    db: &DatabaseConnection,
    cutoff: NaiveDate,
    page_size: u64,
    max_pages: u64,
) -> Result<PriceEventsReport, JobError> {
    let rules = RuleRepository::new(db.clone()).load_rule_set().await?;
    let flags = FlagRepository::snapshot(db).await?;
    info!(%cutoff, ?flags, "starting pricing run");

    let mut report = PriceEventsReport::default();
    let mut pages = 0u64;
    let mut cursor = None;

    loop {
        if max_pages > 0 && pages >= max_pages {
            break;
        }

        let txn = db.begin().await.map_err(JobError::Database)?;
        let events = FinanceEventRepository::claim_page(&txn, cutoff, cursor, page_size).await?;
        if events.is_empty() {
            txn.rollback().await.map_err(JobError::Database)?;
            break;
        }
        cursor = events.last().map(|event| event.id);

        for event in events {
            let event_id = event.id;
            let snapshot = finance_event::to_snapshot(&event);

            let booking = match BookingRepository::snapshot(&txn, event.booking_id).await {
                Ok(booking) => booking,
                Err(err @ (BookingError::NotFound(_) | BookingError::Malformed { .. })) => {
                    warn!(%event_id, error = %err, "parking event: unusable booking");
                    FinanceEventRepository::park_for_review(&txn, event, &err.to_string())
                        .await?;
                    report.parked += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let prior =
                PricingRepository::find_live_for_booking(&txn, snapshot.booking_id).await?;

            match pricing::price(&snapshot, &booking, &rules, &flags, prior.as_ref()) {
                Ok(outcome) => {
                    let event = if snapshot.status == FinanceEventStatus::Pending {
                        FinanceEventRepository::transition(&txn, event, FinanceEventStatus::Ready)
                            .await?
                    } else {
                        event
                    };
                    PricingRepository::apply_outcome(&txn, &outcome).await?;
                    FinanceEventRepository::transition(&txn, event, FinanceEventStatus::Priced)
                        .await?;
                    report.priced += 1;
                }
                Err(err) if err.is_deferred() => {
                    debug!(%event_id, error = %err, "deferring event to next run");
                    report.deferred += 1;
                }
                Err(err) => {
                    warn!(%event_id, error = %err, "parking event for review");
                    FinanceEventRepository::park_for_review(&txn, event, &err.to_string())
                        .await?;
                    report.parked += 1;
                }
            }
        }

        txn.commit().await.map_err(JobError::Database)?;
        pages += 1;
    }

    info!(
        priced = report.priced,
        deferred = report.deferred,
        parked = report.parked,
        "pricing run complete"
    );
    Ok(report)
}
