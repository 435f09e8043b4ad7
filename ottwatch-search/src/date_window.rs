//! Lookback window computation.

use chrono::{Days, NaiveDate, Utc};
use ottwatch_core::MAX_LOOKBACK_DAYS;
use serde::Serialize;

/// Inclusive calendar-date range ending today.
///
/// `start <= end` always holds and the span never exceeds
/// [`MAX_LOOKBACK_DAYS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// First day of the window.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window, normally today.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days between start and end.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether `date` falls inside the window, bounds included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Window of `lookback_days` ending at the current UTC date.
pub fn compute_window(lookback_days: i64) -> DateWindow {
    compute_window_from(Utc::now().date_naive(), lookback_days)
}

/// Window of `lookback_days` ending at `today`, clamped to `[0, MAX_LOOKBACK_DAYS]`.
pub fn compute_window_from(today: NaiveDate, lookback_days: i64) -> DateWindow {
    let days = lookback_days.clamp(0, i64::from(MAX_LOOKBACK_DAYS)) as u64;
    let start = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);

    DateWindow { start, end: today }
}
