//! Date handling for document metadata.
//!
//! The configured format is a chrono strftime string and serves both
//! directions: parsing an explicit `Date:` value and formatting the
//! effective date handed to templates.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::{fmt::Write, time::SystemTime};

/// Fallback used for `Display` and when the configured format cannot render.
pub const ISO_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `value` with `format`.
///
/// Formats without a time component (e.g. `%Y-%m-%d`) are accepted and
/// resolve to midnight. Returns `None` when the value does not match.
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, format)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Format `date` with `format`, falling back to ISO form if chrono rejects
/// the format at render time.
pub fn format_date(date: &NaiveDateTime, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", date.format(ISO_FORMAT));
    }
    out
}

/// Convert a file modification time to local wall-clock time.
pub fn from_system_time(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}
