use std::fmt;
use std::ops::Range;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use super::error::InvoiceError;

/// `strftime` pattern of month labels, e.g. "2014-04".
pub const MONTH_FORMAT: &str = "%Y-%m";

/// A calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Create a month, `month` being 1-based.
    ///
    /// The neighbouring months must be representable too, so that the
    /// previous month's end and this month's end exist.
    pub fn new(year: i32, month: u32) -> Result<Self, InvoiceError> {
        let candidate = Self { year, month };
        if !(1..=12).contains(&month)
            || first_instant(candidate).is_none()
            || first_instant(candidate.previous()).is_none()
            || first_instant(candidate.next()).is_none()
        {
            return Err(InvoiceError::InvalidMonth(format!("{year}-{month}")));
        }
        Ok(candidate)
    }

    /// The month an instant falls into.
    pub fn containing(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First instant of the month.
    pub fn start(&self) -> DateTime<Utc> {
        first_instant(*self).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// First instant of the following month.
    pub fn next_start(&self) -> DateTime<Utc> {
        first_instant(self.next()).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Last representable instant of the month (one microsecond before the
    /// next month starts).
    pub fn end(&self) -> DateTime<Utc> {
        let next_start = self.next_start();
        next_start
            .checked_sub_signed(Duration::microseconds(1))
            .unwrap_or(next_start)
    }

    /// Half-open range covering the month.
    pub fn window(&self) -> Range<DateTime<Utc>> {
        self.start()..self.next_start()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.window().contains(&at)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start().format(MONTH_FORMAT))
    }
}

/// The calendar month before the one containing `now`.
pub fn previous_month(now: DateTime<Utc>) -> Month {
    Month::containing(now).previous()
}

/// `None` outside chrono's date range.
fn first_instant(month: Month) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(month.year, month.month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
