use std::ops::Range;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::types::{PaidTask, ScoreLog};

/// Description of the negative half of a carry-over, dated at month end.
pub const CARRY_OVER_TO_NEXT: &str = "Carryover to the next month";

/// Description of the positive half of a carry-over, dated at the start of
/// the following month.
pub const CARRY_OVER_FROM_PREVIOUS: &str = "Carryover from the previous month";

/// Errors raised by a [`Ledger`] implementation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    /// The store cannot be reached or is in an unusable state.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// A write was rejected; nothing was stored.
    #[error("ledger write rejected: {0}")]
    Rejected(String),
}

/// Record store holding score logs and paid tasks.
///
/// Time windows are half-open: `window.start` inclusive, `window.end`
/// exclusive.
pub trait Ledger {
    /// Score logs of `username` created within `window`.
    fn score_logs(
        &self,
        username: &str,
        window: Range<DateTime<Utc>>,
    ) -> Result<Vec<ScoreLog>, LedgerError>;

    /// Paid tasks of `username` dated within `window`.
    fn paid_tasks(
        &self,
        username: &str,
        window: Range<DateTime<Utc>>,
    ) -> Result<Vec<PaidTask>, LedgerError>;

    /// Correction tasks of `username` dated exactly at `at` with the given
    /// description.
    fn corrections_at(
        &self,
        username: &str,
        at: DateTime<Utc>,
        description: &str,
    ) -> Result<Vec<PaidTask>, LedgerError>;

    /// Store all `tasks` or none of them.
    fn insert_paid_tasks(&self, tasks: Vec<PaidTask>) -> Result<(), LedgerError>;
}
