//! Property tests for key normalization and date parsing.

use chrono::{Datelike, Timelike};
use pps_core::{normalize_key, parse_date};
use proptest::prelude::*;

proptest! {
    #[test]
    fn compound_key_yields_leading_id(
        id in "[a-z0-9:-]{1,24}",
        group in "[A-Z][a-z]{0,12}",
        rest in "[A-Za-z0-9_/\\[\\]]{0,24}",
    ) {
        prop_assume!(!id.ends_with("form"));
        let raw = format!("{id}/{group}form/{rest}");
        prop_assert_eq!(normalize_key(&raw), id.as_str());
    }

    #[test]
    fn key_without_form_segment_is_unchanged(raw in "[a-zA-Z0-9:/_\\[\\]-]{0,40}") {
        prop_assume!(!raw.contains("form/"));
        prop_assert_eq!(normalize_key(&raw), raw.as_str());
    }

    #[test]
    fn normalized_key_is_prefix(raw in "\\PC{0,60}") {
        let key = normalize_key(&raw);
        prop_assert!(raw.starts_with(key));
        prop_assert_eq!(normalize_key(key), key);
    }

    #[test]
    fn iso_date_and_timestamp_agree(year in 1950i32..2100, month in 1u32..=12, day in 1u32..=28) {
        let date = format!("{year:04}-{month:02}-{day:02}");
        let timestamp = format!("{date}T00:00:00.000Z");

        let parsed = parse_date(&date);
        prop_assert!(parsed.is_some());
        prop_assert_eq!(parsed, parse_date(&timestamp));

        let parsed = parsed.unwrap();
        prop_assert_eq!((parsed.year(), parsed.month(), parsed.day()), (year, month, day));
        prop_assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn surrounding_whitespace_is_ignored(year in 1950i32..2100, month in 1u32..=12, day in 1u32..=28) {
        let date = format!("{month:02}/{day:02}/{year:04}");
        prop_assert_eq!(parse_date(&format!("  {date}\t")), parse_date(&date));
    }

    #[test]
    fn arbitrary_text_never_panics(raw in "\\PC{0,40}") {
        let _ = parse_date(&raw);
    }
}
