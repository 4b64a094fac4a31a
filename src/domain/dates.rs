/// Calendar helpers for the weekly strip and the overview grid
///
/// All sequences are computed from the local calendar day and are rebuilt
/// on every call. The `_from` variants take "today" explicitly so callers
/// (and tests) can pin the clock.

use chrono::{Duration, Local, NaiveDate};

use crate::domain::DomainError;

/// Number of days in the weekly strip
pub const WEEK_LEN: usize = 7;

/// Number of days in the overview grid (18 weeks of 7 days)
pub const OVERVIEW_LEN: usize = 126;

/// Canonical completion-date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date on the local calendar
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a date as zero-padded `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a canonical `YYYY-MM-DD` string
///
/// Rejects anything chrono would otherwise tolerate (signed or short
/// years, single-digit months) as well as impossible calendar days.
pub fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !shaped {
        return Err(DomainError::InvalidDate(value.to_string()));
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(value.to_string()))
}

/// Check a string against the canonical format without keeping the date
pub fn is_canonical_date(value: &str) -> bool {
    parse_date(value).is_ok()
}

/// The `len` days ending at `today`, oldest first
fn trailing_days(today: NaiveDate, len: usize) -> Vec<NaiveDate> {
    (0..len as i64)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect()
}

/// Today and the six preceding days, oldest first
pub fn week_days_from(today: NaiveDate) -> Vec<NaiveDate> {
    trailing_days(today, WEEK_LEN)
}

/// Today and the 125 preceding days, oldest first
pub fn overview_days_from(today: NaiveDate) -> Vec<NaiveDate> {
    trailing_days(today, OVERVIEW_LEN)
}

pub fn week_days() -> Vec<NaiveDate> {
    week_days_from(today())
}

pub fn overview_days() -> Vec<NaiveDate> {
    overview_days_from(today())
}
