//! Report metadata pulled from the leading blockquote.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

/// Lowercased label to trimmed value, in encounter order.
pub type Metadata = IndexMap<String, String>;

static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*\s*:\s*([^|*]+)").expect("valid regex"));

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%A, %B %d, %Y",
    "%d %B %Y",
];

/// Scans `**Label**: value` pairs separated by `|` or further bold labels.
///
/// Returns an empty map when nothing matches; callers treat that as "this
/// blockquote is ordinary content".
pub fn parse_metadata(text: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for caps in FIELD_RE.captures_iter(text) {
        metadata.insert(caps[1].trim().to_lowercase(), caps[2].trim().to_string());
    }
    metadata
}

/// Formats a date as `Mon D, YYYY`, or returns the input unchanged when it
/// cannot be parsed.
pub fn format_date(raw: &str) -> String {
    match parse_date(raw.trim()) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(value) {
        return Some(datetime.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|datetime| datetime.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        })
        .or_else(|| parse_year_month(value))
}

/// `YYYY-MM` means the first day of that month.
fn parse_year_month(value: &str) -> Option<NaiveDate> {
    if value.len() != 7 || value.as_bytes()[4] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pipe_separated_fields() {
        let metadata = parse_metadata("**Personas**: Ava, Kai | **Date**: 2024-03-01");
        let pairs: Vec<_> = metadata.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("personas", "Ava, Kai"), ("date", "2024-03-01")]);
    }

    #[test]
    fn value_stops_at_next_bold_label() {
        let metadata = parse_metadata("**Focus**: pricing **Rounds**: 2");
        assert_eq!(metadata.get("focus").map(String::as_str), Some("pricing"));
        assert_eq!(metadata.get("rounds").map(String::as_str), Some("2"));
    }

    #[test]
    fn repeated_label_keeps_first_position() {
        let metadata = parse_metadata("**A**: 1 | **B**: 2 | **a**: 3");
        let keys: Vec<_> = metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(metadata["a"], "3");
    }

    #[test]
    fn plain_quote_is_not_metadata() {
        assert!(parse_metadata("Just a quotation, nothing more.").is_empty());
        assert!(parse_metadata("**bold** without a colon").is_empty());
    }

    #[test]
    fn formats_common_date_shapes() {
        assert_eq!(format_date("2024-03-01"), "Mar 1, 2024");
        assert_eq!(format_date("2024-12-25T10:30:00Z"), "Dec 25, 2024");
        assert_eq!(format_date("2024/07/04"), "Jul 4, 2024");
        assert_eq!(format_date("March 9, 2025"), "Mar 9, 2025");
    }

    #[test]
    fn formats_month_only_and_weekday_dates() {
        assert_eq!(format_date("2024-03"), "Mar 1, 2024");
        assert_eq!(format_date("Friday, March 1, 2024"), "Mar 1, 2024");
        assert_eq!(format_date("2024-13"), "2024-13");
        assert_eq!(format_date("Monday, March 1, 2024"), "Monday, March 1, 2024");
    }

    #[test]
    fn unparseable_date_is_returned_raw() {
        assert_eq!(format_date("sometime in spring"), "sometime in spring");
    }
}
