//! Calendar-date helpers for activity input and display.
//!
//! # Invariants
//! - Formatting is fixed-width `YYYY-MM-DD`.
//! - Parsing never shifts the calendar day written by the user; timestamps keep
//!   their written date regardless of offset.

use chrono::{DateTime, NaiveDate};

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const DAY_FIRST_FORMAT: &str = "%d/%m/%Y";

/// Formats a calendar date for pre-filling a date input field.
pub fn format_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Parses a user-entered date string.
///
/// Accepted shapes:
/// - `YYYY-MM-DD` (what date inputs report)
/// - RFC 3339 timestamps such as `2024-01-01T00:00:00.000Z`
/// - `DD/MM/YYYY`
///
/// Returns `None` when no shape matches.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(trimmed, DAY_FIRST_FORMAT).ok()
}
