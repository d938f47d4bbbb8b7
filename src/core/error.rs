use thiserror::Error;

use super::ledger::LedgerError;
use super::types::{PaidTaskType, RateKind};

/// Errors that can occur while configuring or computing an invoice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoiceError {
    /// The invoice configuration of a user lacks mandatory fields.
    #[error(
        "invoice configuration for user {username} is missing required field(s): {}",
        .missing.join(", ")
    )]
    ImproperlyConfigured {
        username: String,
        missing: Vec<&'static str>,
    },

    /// Score logs of the month recorded more than one rate for a category.
    #[error("Multiple {kind} values recorded for user {username}")]
    InconsistentRecordedRates { username: String, kind: RateKind },

    /// Paid tasks of the month disagree on the rate for a task type, either
    /// among themselves or with the rate recorded in score logs.
    #[error("Multiple {task_type} rate values for user {username}")]
    InconsistentTaskRates {
        username: String,
        task_type: PaidTaskType,
    },

    /// Month outside of 1..=12 or not representable.
    #[error("invalid month: {0}")]
    InvalidMonth(String),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The underlying record store failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl InvoiceError {
    /// Username the error refers to, if any.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::ImproperlyConfigured { username, .. }
            | Self::InconsistentRecordedRates { username, .. }
            | Self::InconsistentTaskRates { username, .. } => Some(username),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improperly_configured_lists_fields() {
        let err = InvoiceError::ImproperlyConfigured {
            username: "alice".into(),
            missing: vec!["name", "wire_info"],
        };
        assert_eq!(
            err.to_string(),
            "invoice configuration for user alice is missing required field(s): name, wire_info"
        );
        assert_eq!(err.username(), Some("alice"));
    }

    #[test]
    fn rate_errors_name_user_and_category() {
        let err = InvoiceError::InconsistentRecordedRates {
            username: "bob".into(),
            kind: RateKind::Translation,
        };
        assert_eq!(err.to_string(), "Multiple rate values recorded for user bob");

        let err = InvoiceError::InconsistentTaskRates {
            username: "bob".into(),
            task_type: PaidTaskType::HourlyWork,
        };
        assert_eq!(err.to_string(), "Multiple HOURLY_WORK rate values for user bob");
    }

    #[test]
    fn ledger_error_has_no_username() {
        let err = InvoiceError::from(LedgerError::Unavailable("lock poisoned".into()));
        assert!(err.username().is_none());
    }
}
