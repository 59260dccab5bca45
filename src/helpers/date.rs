//! Date helper functions

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::fmt::Write as _;

/// Stand-in for the ordinal day until after chrono has formatted the rest
const ORDINAL_MARKER: &str = "\u{1}";

/// Format a date using a Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "MMM Do, YYYY") // -> Ok("Oct 9th, 2019")
/// ```
///
/// Time tokens (`HH`, `mm`, ...) have nothing to format on a date and fail.
pub fn format_date(date: &NaiveDate, format: &str) -> Result<String> {
    let chrono_format = moment_to_chrono_format(format);
    let mut out = String::new();
    write!(out, "{}", date.format(&chrono_format))
        .map_err(|_| anyhow!("Date format {:?} cannot be applied to a date", format))?;
    Ok(out.replace(ORDINAL_MARKER, &ordinal(date.day())))
}

/// Parse a date as written in content files
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let formats = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// English ordinal for a day of the month
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        // Day of month, longest first
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("Do", ORDINAL_MARKER),
        ("D", "%-d"),
        // Time
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.replace('%', "%%");

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
