//! Inclusive calendar-day windows used by every aggregation.

use crate::error::{CopilotError, CopilotResult};
use chrono::{Duration, NaiveDate};
use std::fmt;

/// An inclusive `[start, end]` range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CopilotResult<Self> {
        if start > end {
            return Err(CopilotError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days`-long window ending on `end`. A zero length is treated as one day.
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            start: end - Duration::days(span),
            end,
        }
    }

    /// Number of calendar days covered, counting both ends.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The window of equal length that ends the day before this one starts.
    pub fn prior(&self) -> Self {
        let len = Duration::days(self.len_days());
        Self {
            start: self.start - len,
            end: self.end - len,
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
