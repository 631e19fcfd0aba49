//! Date parsing for survey exports.
//!
//! Exports mix ISO timestamps (submission metadata) with whatever the data
//! collector's device produced for date questions. Every format is tried in a
//! fixed order; a value that matches none of them is treated as absent.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// A single accepted date shape.
#[derive(Debug, Clone, Copy)]
enum DateFormat {
    /// Carries a UTC offset.
    Zoned(&'static str),
    /// Date and time without offset, read as UTC.
    Naive(&'static str),
    /// Date only, read as midnight UTC.
    Date(&'static str),
}

/// Accepted formats in evaluation order. Datetime shapes come before the
/// bare-date shapes they start with; US month-first precedes European day-first.
const DATE_FORMATS: &[DateFormat] = &[
    DateFormat::Zoned("%Y-%m-%dT%H:%M:%S%.f%:z"),
    DateFormat::Zoned("%Y-%m-%dT%H:%M:%S%.f%z"),
    DateFormat::Naive("%Y-%m-%dT%H:%M:%S%.fZ"),
    DateFormat::Naive("%Y-%m-%dT%H:%M:%S%.f"),
    DateFormat::Naive("%Y-%m-%d %H:%M:%S%.f"),
    DateFormat::Naive("%Y-%m-%d %H:%M"),
    DateFormat::Date("%Y-%m-%d"),
    DateFormat::Naive("%m/%d/%Y %H:%M:%S"),
    DateFormat::Naive("%m/%d/%Y %H:%M"),
    DateFormat::Date("%m/%d/%Y"),
    DateFormat::Date("%d/%m/%Y"),
    DateFormat::Date("%Y/%m/%d"),
    DateFormat::Date("%d-%m-%Y"),
];

impl DateFormat {
    fn parse(self, s: &str) -> Option<DateTime<Utc>> {
        match self {
            DateFormat::Zoned(fmt) => DateTime::parse_from_str(s, fmt)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            DateFormat::Naive(fmt) => NaiveDateTime::parse_from_str(s, fmt)
                .ok()
                .map(|dt| Utc.from_utc_datetime(&dt)),
            DateFormat::Date(fmt) => NaiveDate::parse_from_str(s, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| Utc.from_utc_datetime(&dt)),
        }
    }
}

/// Parse a date cell, returning `None` when it is empty or unrecognized.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS.iter().find_map(|format| format.parse(s))
}
