//! Job and education dates as they appear on the page.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point on a resume timeline, parsed as precisely as the input allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePoint {
    Month { year: i32, month: u32 },
    Year(i32),
    Present,
    /// Unrecognized input, kept verbatim.
    Text(String),
}

const PRESENT_WORDS: &[&str] = &["present", "current", "now", "ongoing", "today"];

impl TimePoint {
    /// Parses a date string. Returns `None` for blank input only; anything
    /// unrecognized becomes `TimePoint::Text`.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        if PRESENT_WORDS.iter().any(|w| s.eq_ignore_ascii_case(w)) {
            return Some(TimePoint::Present);
        }
        if let Some(date) = parse_month_precision(s) {
            return Some(TimePoint::Month {
                year: date.year(),
                month: date.month(),
            });
        }
        if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(year) = s.parse::<i32>() {
                return Some(TimePoint::Year(year));
            }
        }
        Some(TimePoint::Text(s.to_string()))
    }

    /// Accepts a string or a bare year number.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => n
                .as_i64()
                .and_then(|y| i32::try_from(y).ok())
                .map(TimePoint::Year),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            TimePoint::Month { year, month } => NaiveDate::from_ymd_opt(*year, *month, 1)
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_else(|| year.to_string()),
            TimePoint::Year(year) => year.to_string(),
            TimePoint::Present => "Present".to_string(),
            TimePoint::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn parse_month_precision(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("01/{s}"), "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("1 {s}"), "%d %B %Y"))
        .ok()
}

/// `"Jan 2020 – Present"`, `"2019"`, or empty when neither end is known.
pub fn range_label(start: Option<&TimePoint>, end: Option<&TimePoint>) -> String {
    match (start, end) {
        (Some(s), Some(e)) => format!("{s} – {e}"),
        (Some(s), None) => s.label(),
        (None, Some(e)) => e.label(),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_iso_formats() {
        assert_eq!(
            TimePoint::parse("2020-03-15"),
            Some(TimePoint::Month { year: 2020, month: 3 })
        );
        assert_eq!(
            TimePoint::parse("2021-11"),
            Some(TimePoint::Month { year: 2021, month: 11 })
        );
        assert_eq!(
            TimePoint::parse("2022-06-01T00:00:00Z"),
            Some(TimePoint::Month { year: 2022, month: 6 })
        );
    }

    #[test]
    fn test_parse_human_formats() {
        assert_eq!(
            TimePoint::parse("Jan 2019"),
            Some(TimePoint::Month { year: 2019, month: 1 })
        );
        assert_eq!(
            TimePoint::parse("September 2018"),
            Some(TimePoint::Month { year: 2018, month: 9 })
        );
        assert_eq!(
            TimePoint::parse("07/2017"),
            Some(TimePoint::Month { year: 2017, month: 7 })
        );
        assert_eq!(TimePoint::parse("2015"), Some(TimePoint::Year(2015)));
    }

    #[test]
    fn test_present_words() {
        assert_eq!(TimePoint::parse("Present"), Some(TimePoint::Present));
        assert_eq!(TimePoint::parse(" current "), Some(TimePoint::Present));
    }

    #[test]
    fn test_unrecognized_kept_verbatim() {
        assert_eq!(
            TimePoint::parse("Spring term"),
            Some(TimePoint::Text("Spring term".to_string()))
        );
        assert_eq!(TimePoint::parse("   "), None);
    }

    #[test]
    fn test_from_value_accepts_numbers() {
        assert_eq!(TimePoint::from_value(&json!(2012)), Some(TimePoint::Year(2012)));
        assert_eq!(TimePoint::from_value(&json!(null)), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(TimePoint::Month { year: 2020, month: 1 }.label(), "Jan 2020");
        assert_eq!(
            range_label(
                Some(&TimePoint::Month { year: 2020, month: 1 }),
                Some(&TimePoint::Present)
            ),
            "Jan 2020 – Present"
        );
        assert_eq!(range_label(None, None), "");
    }
}
