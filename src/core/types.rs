use std::fmt;
use std::ops::Add;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A translator or reviewer being paid for their work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique login name.
    pub username: String,
    /// Price per translated word.
    pub rate: Option<Decimal>,
    /// Price per reviewed word.
    pub review_rate: Option<Decimal>,
    /// Price per hour of hourly work.
    pub hourly_rate: Option<Decimal>,
}

impl User {
    /// A user without any rates set.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            rate: None,
            review_rate: None,
            hourly_rate: None,
        }
    }

    /// Set the price per translated word.
    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Set the price per reviewed word.
    pub fn with_review_rate(mut self, rate: Decimal) -> Self {
        self.review_rate = Some(rate);
        self
    }

    /// Set the price per hour.
    pub fn with_hourly_rate(mut self, rate: Decimal) -> Self {
        self.hourly_rate = Some(rate);
        self
    }
}

/// Kind of action a score log entry records.
///
/// [`code`](Self::code) and [`from_code`](Self::from_code) map to the numeric
/// values 0 to 11 stored by the scoring subsystem. Serde uses the upper-case
/// variant names instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranslationActionCode {
    New,
    Edited,
    EditedOwn,
    Deleted,
    Reviewed,
    EditPenalty,
    ReviewPenalty,
    SuggestionAdded,
    SuggestionAccepted,
    SuggestionRejected,
    SuggestionReviewedAccepted,
    SuggestionReviewedRejected,
}

impl TranslationActionCode {
    const ALL: [Self; 12] = [
        Self::New,
        Self::Edited,
        Self::EditedOwn,
        Self::Deleted,
        Self::Reviewed,
        Self::EditPenalty,
        Self::ReviewPenalty,
        Self::SuggestionAdded,
        Self::SuggestionAccepted,
        Self::SuggestionRejected,
        Self::SuggestionReviewedAccepted,
        Self::SuggestionReviewedRejected,
    ];

    /// Stored numeric code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Action for a stored numeric code, `None` for unknown codes.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Whether the words of this action are paid as translated words.
    pub fn is_paid_translation(self) -> bool {
        self == Self::New
    }

    /// Whether the words of this action are paid as reviewed words.
    pub fn is_paid_review(self) -> bool {
        self == Self::Reviewed
    }
}

/// Immutable record of one scored translation or review action.
///
/// The user's rates at the time of the action are kept alongside the record
/// so that later profile changes do not reprice past work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreLog {
    /// User who performed the action.
    pub username: String,
    /// Number of words affected.
    pub wordcount: u32,
    /// What was done.
    pub action_code: TranslationActionCode,
    /// When the action was scored.
    pub creation_time: DateTime<Utc>,
    /// Similarity against existing translations, 0 to 1.
    pub similarity: Decimal,
    /// Submission the action belongs to, if any.
    pub submission_id: Option<u64>,
    /// Translation rate of the user when the action was scored.
    pub rate: Option<Decimal>,
    /// Review rate of the user when the action was scored.
    pub review_rate: Option<Decimal>,
}

impl ScoreLog {
    /// Records an action for `user`, capturing their current rates.
    pub fn record(
        user: &User,
        action_code: TranslationActionCode,
        wordcount: u32,
        creation_time: DateTime<Utc>,
    ) -> Self {
        Self {
            username: user.username.clone(),
            wordcount,
            action_code,
            creation_time,
            similarity: Decimal::ZERO,
            submission_id: None,
            rate: user.rate,
            review_rate: user.review_rate,
        }
    }

    /// Set the similarity score.
    pub fn with_similarity(mut self, similarity: Decimal) -> Self {
        self.similarity = similarity;
        self
    }

    /// Link the action to a submission.
    pub fn with_submission(mut self, submission_id: u64) -> Self {
        self.submission_id = Some(submission_id);
        self
    }
}

/// Category of a manually entered paid task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaidTaskType {
    /// Amount is a number of translated words.
    Translation,
    /// Amount is a number of reviewed words.
    Review,
    /// Amount is a number of hours.
    HourlyWork,
    /// Amount is money, added as-is.
    Correction,
}

impl PaidTaskType {
    /// Upper-case name, as used in error messages and serialized data.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translation => "TRANSLATION",
            Self::Review => "REVIEW",
            Self::HourlyWork => "HOURLY_WORK",
            Self::Correction => "CORRECTION",
        }
    }
}

impl fmt::Display for PaidTaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manually recorded billable task or correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaidTask {
    /// User the task is paid to.
    pub username: String,
    /// Category, which also decides the unit of `amount`.
    pub task_type: PaidTaskType,
    /// Words, hours or money, depending on `task_type`.
    pub amount: Decimal,
    /// Price per unit of `amount`; 1 for corrections.
    pub rate: Decimal,
    /// Date the task is booked on.
    pub datetime: DateTime<Utc>,
    /// Free-form note; carry-over entries use fixed descriptions.
    pub description: Option<String>,
}

impl PaidTask {
    /// A task without description.
    pub fn new(
        username: impl Into<String>,
        task_type: PaidTaskType,
        amount: Decimal,
        rate: Decimal,
        datetime: DateTime<Utc>,
    ) -> Self {
        Self {
            username: username.into(),
            task_type,
            amount,
            rate,
            datetime,
            description: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the amount is money rather than work.
    pub fn is_correction(&self) -> bool {
        self.task_type == PaidTaskType::Correction
    }
}

/// Rate category recorded on score logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateKind {
    /// Price per translated word, `rate`.
    Translation,
    /// Price per reviewed word, `review_rate`.
    Review,
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Translation => "rate",
            Self::Review => "review_rate",
        })
    }
}

/// Resolved rates for an invoice month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rates {
    /// Price per translated word.
    pub translation: Option<Decimal>,
    /// Price per reviewed word.
    pub review: Option<Decimal>,
    /// Price per hour.
    pub hourly: Option<Decimal>,
}

/// Quantities of work for one user and month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAmounts {
    /// Translated words.
    pub translated: Decimal,
    /// Reviewed words.
    pub reviewed: Decimal,
    /// Hours of hourly work.
    pub hours: Decimal,
    /// Money from corrections.
    pub correction: Decimal,
}

impl Add for UserAmounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            translated: self.translated + rhs.translated,
            reviewed: self.reviewed + rhs.reviewed,
            hours: self.hours + rhs.hours,
            correction: self.correction + rhs.correction,
        }
    }
}

/// Money figures of a generated invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amounts {
    /// Priced work plus corrections.
    pub subtotal: Decimal,
    /// Corrections included in the subtotal, or the carry-over entry once
    /// the month is carried over.
    pub correction: Decimal,
    /// Amount to pay out this month.
    pub total: Decimal,
    /// Deferred subtotal when the payment was carried over.
    pub balance: Option<Decimal>,
    /// Configured extra added to a payout.
    pub extra_amount: Decimal,
}
