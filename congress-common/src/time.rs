//! Timestamp and congressional calendar utilities

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Year the 1st Congress convened; each Congress spans two calendar years.
const FIRST_CONGRESS_YEAR: i32 = 1789;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

/// Parse the leading `YYYY-MM-DD` portion of a date or timestamp string.
///
/// Returns `None` for anything shorter than ten characters or not a valid
/// calendar date.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let head = value.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Normalize an API timestamp (`2022-03-01T14:00:00Z`) to `YYYY-MM-DD`.
///
/// Full RFC 3339 timestamps keep the calendar date of their stated offset
/// (no UTC conversion); anything else falls back to its first ten
/// characters when those form a valid date.
pub fn normalize_api_date(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    parse_iso_date(value).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Congress number in session during `year` (2020 → 116, 2021 → 117).
pub fn congress_for_year(year: i32) -> u32 {
    ((year - FIRST_CONGRESS_YEAR) / 2 + 1).max(1) as u32
}

/// Session number (1 or 2) of the Congress in session during `year`.
pub fn session_for_year(year: i32) -> u32 {
    if (year - FIRST_CONGRESS_YEAR) % 2 == 0 {
        1
    } else {
        2
    }
}

/// Whether `date` falls inside `[start, end]`.
///
/// Records without a parseable date are kept: the range filter only drops
/// records it can prove are out of range.
pub fn in_date_range(date: Option<&str>, start: NaiveDate, end: NaiveDate) -> bool {
    match date.and_then(parse_iso_date) {
        Some(d) => start <= d && d <= end,
        None => true,
    }
}

/// Calendar years covered by `[start, end]`
pub fn years_between(start: NaiveDate, end: NaiveDate) -> std::ops::RangeInclusive<i32> {
    start.year()..=end.year()
}
