//! Invoice reference numbering.
//!
//! Invoices receive gapless, strictly increasing references of the form
//! `{prefix}{yy}{seq:07}` (e.g. `F240000001`). The sequence resets at the
//! start of each calendar year; the persisted scheme row is updated under
//! the same transaction as the invoice insert so references are never
//! reused.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of the numeric part of a reference.
const SEQUENCE_WIDTH: usize = 7;
/// Highest sequence number expressible in [`SEQUENCE_WIDTH`] digits.
const SEQUENCE_MAX: u64 = 9_999_999;

/// Errors that can occur while allocating invoice references.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvoiceError {
    /// The yearly sequence ran out of digits.
    #[error("Reference sequence for prefix {prefix} exhausted for year {year}")]
    SequenceExhausted { prefix: String, year: i32 },

    /// An allocation was requested for a year before the scheme's current
    /// year. Sequences only move forward.
    #[error("Cannot allocate a {requested} reference: scheme is already at year {current}")]
    YearMovedBackwards { requested: i32, current: i32 },
}

/// Allocator state for one reference prefix, mirroring the persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceScheme {
    /// Reference prefix, e.g. "F" for invoices.
    pub prefix: String,
    /// Calendar year the sequence is currently counting in.
    pub year: i32,
    /// Next sequence number to hand out (1-based).
    pub next_number: u64,
}

impl ReferenceScheme {
    /// Creates a fresh scheme starting at 1 for the given year.
    #[must_use]
    pub fn new(prefix: impl Into<String>, year: i32) -> Self {
        Self {
            prefix: prefix.into(),
            year,
            next_number: 1,
        }
    }

    /// Allocates the next reference for the given year, advancing the
    /// scheme. Moving to a later year resets the sequence to 1.
    ///
    /// # Errors
    ///
    /// Fails when the year moves backwards or the sequence is exhausted.
    pub fn allocate(&mut self, year: i32) -> Result<String, InvoiceError> {
        if year < self.year {
            return Err(InvoiceError::YearMovedBackwards {
                requested: year,
                current: self.year,
            });
        }
        if year > self.year {
            self.year = year;
            self.next_number = 1;
        }
        if self.next_number > SEQUENCE_MAX {
            return Err(InvoiceError::SequenceExhausted {
                prefix: self.prefix.clone(),
                year: self.year,
            });
        }

        let reference = format!(
            "{}{:02}{:0width$}",
            self.prefix,
            self.year.rem_euclid(100),
            self.next_number,
            width = SEQUENCE_WIDTH
        );
        self.next_number += 1;
        Ok(reference)
    }
}
