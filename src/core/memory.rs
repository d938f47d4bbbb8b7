use std::ops::Range;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::ledger::{Ledger, LedgerError};
use super::types::{PaidTask, ScoreLog};

/// In-memory ledger.
///
/// Intended for tests and embedding. Lookups are linear scans.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    score_logs: RwLock<Vec<ScoreLog>>,
    paid_tasks: RwLock<Vec<PaidTask>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_score_log(&self, log: ScoreLog) -> Result<(), LedgerError> {
        self.score_logs.write().map_err(poisoned)?.push(log);
        Ok(())
    }

    pub fn add_paid_task(&self, task: PaidTask) -> Result<(), LedgerError> {
        self.paid_tasks.write().map_err(poisoned)?.push(task);
        Ok(())
    }

    /// Snapshot of every stored paid task, in insertion order.
    pub fn all_paid_tasks(&self) -> Result<Vec<PaidTask>, LedgerError> {
        Ok(self.paid_tasks.read().map_err(poisoned)?.clone())
    }
}

fn poisoned<T>(_: T) -> LedgerError {
    LedgerError::Unavailable("lock poisoned".to_string())
}

impl Ledger for InMemoryLedger {
    fn score_logs(
        &self,
        username: &str,
        window: Range<DateTime<Utc>>,
    ) -> Result<Vec<ScoreLog>, LedgerError> {
        let logs = self.score_logs.read().map_err(poisoned)?;
        Ok(logs
            .iter()
            .filter(|l| l.username == username && window.contains(&l.creation_time))
            .cloned()
            .collect())
    }

    fn paid_tasks(
        &self,
        username: &str,
        window: Range<DateTime<Utc>>,
    ) -> Result<Vec<PaidTask>, LedgerError> {
        let tasks = self.paid_tasks.read().map_err(poisoned)?;
        Ok(tasks
            .iter()
            .filter(|t| t.username == username && window.contains(&t.datetime))
            .cloned()
            .collect())
    }

    fn corrections_at(
        &self,
        username: &str,
        at: DateTime<Utc>,
        description: &str,
    ) -> Result<Vec<PaidTask>, LedgerError> {
        let tasks = self.paid_tasks.read().map_err(poisoned)?;
        Ok(tasks
            .iter()
            .filter(|t| {
                t.is_correction()
                    && t.username == username
                    && t.datetime == at
                    && t.description.as_deref() == Some(description)
            })
            .cloned()
            .collect())
    }

    fn insert_paid_tasks(&self, tasks: Vec<PaidTask>) -> Result<(), LedgerError> {
        // One write guard for the whole batch keeps the insert atomic.
        let mut stored = self.paid_tasks.write().map_err(poisoned)?;
        stored.extend(tasks);
        Ok(())
    }
}
