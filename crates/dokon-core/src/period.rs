//! # Reporting Periods
//!
//! Resolves a period selector into a half-open `[start, end)` window of UTC
//! instants. "Today" and "this month" are calendar notions, so every window
//! is computed in the shop's UTC offset and converted back.
//!
//! ```text
//! Period     window (local calendar)                previous window
//! ─────────  ─────────────────────────────────────  ──────────────────────
//! Today      [00:00 today, 00:00 tomorrow)          yesterday
//! Week       [now − 7×24h, 00:00 tomorrow)          [now − 14×24h, now − 7×24h)
//! Month      [1st of month, 1st of next month)      prior calendar month
//! Year       [1 Jan, 1 Jan next year)               prior calendar year
//! Custom     [start 00:00, day after end 00:00)     same length, just before
//! ```

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::{validate_date_range, ValidationResult};

// =============================================================================
// Period
// =============================================================================

/// Period selector on the reports and sales screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    Today,
    Week,
    Month,
    Year,
    /// Inclusive date range in the shop's calendar.
    Custom {
        #[ts(as = "String")]
        start: NaiveDate,
        #[ts(as = "String")]
        end: NaiveDate,
    },
}

impl Default for Period {
    fn default() -> Self {
        Period::Today
    }
}

impl Period {
    /// Rejects a custom range whose end precedes its start.
    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            Period::Custom { start, end } => validate_date_range(*start, *end),
            _ => Ok(()),
        }
    }

    /// Resolves the window this period covers at `now`.
    pub fn window(&self, now: DateTime<FixedOffset>) -> Window {
        let offset = *now.offset();
        let today = now.date_naive();
        let tomorrow = today + Duration::days(1);

        match self {
            Period::Today => Window::local_days(today, tomorrow, offset),
            Period::Week => Window {
                start: now.with_timezone(&Utc) - Duration::days(7),
                end: local_midnight(tomorrow, offset),
            },
            Period::Month => {
                let first = month_start(today);
                Window::local_days(first, next_month_start(first), offset)
            }
            Period::Year => {
                let first = year_start(today);
                Window::local_days(first, next_year_start(first), offset)
            }
            Period::Custom { start, end } => {
                Window::local_days(*start, *end + Duration::days(1), offset)
            }
        }
    }

    /// Resolves the window one period-length before [`Period::window`].
    pub fn previous_window(&self, now: DateTime<FixedOffset>) -> Window {
        let offset = *now.offset();
        let today = now.date_naive();

        match self {
            Period::Today => Window::local_days(today - Duration::days(1), today, offset),
            Period::Week => {
                let now = now.with_timezone(&Utc);
                Window {
                    start: now - Duration::days(14),
                    end: now - Duration::days(7),
                }
            }
            Period::Month => {
                let first = month_start(today);
                Window::local_days(month_start(first - Duration::days(1)), first, offset)
            }
            Period::Year => {
                let first = year_start(today);
                Window::local_days(year_start(first - Duration::days(1)), first, offset)
            }
            Period::Custom { start, end } => {
                let days = (*end - *start).num_days() + 1;
                Window::local_days(*start - Duration::days(days), *start, offset)
            }
        }
    }

    /// Short label for report headers.
    pub fn label(&self) -> String {
        match self {
            Period::Today => "today".to_string(),
            Period::Week => "last 7 days".to_string(),
            Period::Month => "this month".to_string(),
            Period::Year => "this year".to_string(),
            Period::Custom { start, end } => format!("{start} – {end}"),
        }
    }
}

// =============================================================================
// Window
// =============================================================================

/// A half-open range of instants, `start <= t < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Window {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "String")]
    pub end: DateTime<Utc>,
}

impl Window {
    /// `[from 00:00, until 00:00)` in the given offset.
    pub fn local_days(from: NaiveDate, until: NaiveDate, offset: FixedOffset) -> Self {
        Window {
            start: local_midnight(from, offset),
            end: local_midnight(until, offset),
        }
    }

    #[inline]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

// =============================================================================
// Calendar helpers
// =============================================================================

/// Local midnight of `date` as a UTC instant.
fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn next_month_start(first: NaiveDate) -> NaiveDate {
    // 32 days past the 1st always lands in the next month
    month_start(first + Duration::days(32))
}

fn year_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.ordinal0()))
}

fn next_year_start(first: NaiveDate) -> NaiveDate {
    year_start(first + Duration::days(366))
}

// =============================================================================
// Unit Tests
// =============================================================================
