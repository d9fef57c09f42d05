//! Settlement period for cashflow batching.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A settlement period bounding one cashflow batch.
///
/// The period is half-open: a pricing belongs to the period when its
/// pricing date falls in `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPeriod {
    /// Human-readable batch label (e.g. "VIR-2024-03"), unique per batch.
    pub label: String,
    /// First day of the period (inclusive).
    pub start: NaiveDate,
    /// First day after the period (exclusive).
    pub end: NaiveDate,
}

impl BatchPeriod {
    /// Builds the monthly settlement period for the given year and month.
    ///
    /// Returns `None` if `month` is not in `1..=12`.
    #[must_use]
    pub fn monthly(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            label: format!("VIR-{year}-{month:02}"),
            start,
            end,
        })
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Last day of the period, used for "bank account as of" lookups.
    #[must_use]
    pub fn cutoff(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.end)
    }

    /// Calendar year the period belongs to (year of the start date).
    #[must_use]
    pub fn year(&self) -> i32 {
        self.start.year()
    }
}
