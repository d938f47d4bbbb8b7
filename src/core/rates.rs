//! Rate reconciliation.
//!
//! Rates are taken from the records of the invoiced month when there are
//! any, since the user's profile may have changed after the work was done.
//! Records that disagree are reported, never resolved.

use rust_decimal::Decimal;

use super::error::InvoiceError;
use super::types::{PaidTask, PaidTaskType, RateKind, Rates, ScoreLog, User};

/// Resolve the translation, review and hourly rates of `user` from the
/// month's score logs and paid tasks, falling back to the profile rates.
pub fn resolve_rates(
    user: &User,
    score_logs: &[ScoreLog],
    paid_tasks: &[PaidTask],
) -> Result<Rates, InvoiceError> {
    let logged_rate = recorded_rate(
        user,
        RateKind::Translation,
        score_logs.iter().filter_map(|l| l.rate),
    )?;
    let logged_review_rate =
        recorded_rate(user, RateKind::Review, score_logs.iter().filter_map(|l| l.review_rate))?;

    let translation = task_rate(user, PaidTaskType::Translation, paid_tasks, logged_rate)?;
    let review = task_rate(user, PaidTaskType::Review, paid_tasks, logged_review_rate)?;
    let hourly = task_rate(user, PaidTaskType::HourlyWork, paid_tasks, None)?;

    let rates = Rates {
        translation: translation.or(user.rate),
        review: review.or(user.review_rate),
        hourly: hourly.or(user.hourly_rate),
    };
    tracing::debug!(
        username = %user.username,
        translation = ?rates.translation,
        review = ?rates.review,
        hourly = ?rates.hourly,
        "resolved invoice rates"
    );
    Ok(rates)
}

fn recorded_rate(
    user: &User,
    kind: RateKind,
    values: impl Iterator<Item = Decimal>,
) -> Result<Option<Decimal>, InvoiceError> {
    single(values).ok_or_else(|| InvoiceError::InconsistentRecordedRates {
        username: user.username.clone(),
        kind,
    })
}

/// Rate of the month's tasks of `task_type`, which must also agree with the
/// rate `logged` in score logs for the same category.
fn task_rate(
    user: &User,
    task_type: PaidTaskType,
    paid_tasks: &[PaidTask],
    logged: Option<Decimal>,
) -> Result<Option<Decimal>, InvoiceError> {
    let inconsistent = || InvoiceError::InconsistentTaskRates {
        username: user.username.clone(),
        task_type,
    };

    let rates = paid_tasks
        .iter()
        .filter(|t| t.task_type == task_type)
        .map(|t| t.rate);
    let from_tasks = single(rates).ok_or_else(inconsistent)?;

    match (from_tasks, logged) {
        (Some(task), Some(log)) if task != log => Err(inconsistent()),
        (task, log) => Ok(task.or(log)),
    }
}

/// The only distinct value, `Some(None)` if there are none, `None` if
/// there are several.
fn single(values: impl Iterator<Item = Decimal>) -> Option<Option<Decimal>> {
    let mut found: Option<Decimal> = None;
    for value in values {
        match found {
            Some(existing) if existing != value => return None,
            _ => found = Some(value),
        }
    }
    Some(found)
}
