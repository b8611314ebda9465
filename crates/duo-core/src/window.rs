//! UTC calendar windows.
//!
//! Every due-date comparison in the engine goes through these types: a
//! calendar date is a [`NaiveDate`], an instant is a `DateTime<Utc>`, and the
//! two only meet here. No local-time conversion ever happens.

use crate::error::CoreError;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Bounds accepted by the monthly summary query.
pub const MIN_SUMMARY_YEAR: i32 = 2000;
pub const MAX_SUMMARY_YEAR: i32 = 2100;

/// 00:00:00.000 UTC on `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// 23:59:59.999 UTC on `date`.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    // 23:59:59.999 is always a valid wall time
    date.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN))
        .and_utc()
}

/// The `[00:00:00.000Z, 23:59:59.999Z]` window of one UTC calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            date,
            start: start_of_day(date),
            end: end_of_day(date),
        }
    }

    /// The window of the calendar date `instant` falls on.
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self::of(instant.date_naive())
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Narrows the window to the instants strictly before `cutoff`, e.g. a
    /// deletion instant. Returns `None` if nothing of the window is left.
    pub fn clipped_at(&self, cutoff: DateTime<Utc>) -> Option<Self> {
        if cutoff <= self.start {
            return None;
        }
        Some(Self {
            end: self.end.min(cutoff - Duration::nanoseconds(1)),
            ..*self
        })
    }
}

/// First and last instant of a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            CoreError::InvalidInput(format!("Invalid month: {year}-{month:02}"))
        })?;
        let next_month_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let last_day = next_month_first
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| CoreError::InvalidInput(format!("Month out of range: {year}-{month:02}")))?;

        Ok(Self {
            year,
            month,
            first_day,
            last_day,
            start: start_of_day(first_day),
            end: end_of_day(last_day),
        })
    }

    /// Like [`MonthWindow::new`] but restricted to the years the summary
    /// query accepts.
    pub fn for_summary(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(MIN_SUMMARY_YEAR..=MAX_SUMMARY_YEAR).contains(&year) {
            return Err(CoreError::InvalidInput(format!(
                "Year must be between {MIN_SUMMARY_YEAR} and {MAX_SUMMARY_YEAR}, got {year}"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidInput(format!(
                "Month must be between 1 and 12, got {month}"
            )));
        }
        Self::new(year, month)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.first_day <= date && date <= self.last_day
    }
}
