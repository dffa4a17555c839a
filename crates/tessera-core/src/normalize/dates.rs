//! Date parsing for archive metadata
//!
//! Archives report dates as bare years, ranges, century notation, and
//! approximate markers. Parsing failure yields all-None — never a
//! partial or incorrect date.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tessera_domain::DateUncertainty;

/// Outcome of parsing a free-form date string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParsedDate {
    pub date_created: Option<NaiveDate>,
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,
    pub uncertainty: Option<DateUncertainty>,
}

lazy_static! {
    static ref CIRCA: Regex =
        Regex::new(r"(?i)\b(?:circa|ca\.?|c\.)\s*(\d{3,4})\b").unwrap();
    static ref BEFORE: Regex = Regex::new(r"(?i)\bbefore\s+(\d{3,4})\b").unwrap();
    static ref AFTER: Regex = Regex::new(r"(?i)\bafter\s+(\d{3,4})\b").unwrap();
    static ref CENTURY: Regex =
        Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\s+century\b").unwrap();
    static ref RANGE: Regex = Regex::new(r"\b(\d{3,4})\s*[-\u{2013}]\s*(\d{3,4})\b").unwrap();
    static ref DAY_MONTH_YEAR: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{4})\b",
    )
    .unwrap();
    static ref YEAR: Regex = Regex::new(r"\b(\d{4})\b").unwrap();
}

fn month_number(name: &str) -> Option<u32> {
    let months = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    months
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

fn year_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

fn year_end(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
}

/// Parse a free-form date string into canonical temporal fields.
///
/// The first matching pattern wins; patterns are ordered so qualified
/// forms ("circa 1850", "14th century") are seen before the bare year
/// they contain.
pub fn parse_date_text(text: &str) -> ParsedDate {
    let text = text.trim();
    if text.is_empty() {
        return ParsedDate::default();
    }

    if let Some(caps) = CIRCA.captures(text) {
        if let Some(date) = caps[1].parse().ok().and_then(year_start) {
            return ParsedDate {
                date_created: Some(date),
                uncertainty: Some(DateUncertainty::Circa),
                ..Default::default()
            };
        }
    }

    if let Some(caps) = BEFORE.captures(text) {
        if let Some(date) = caps[1].parse().ok().and_then(year_start) {
            return ParsedDate {
                date_created: Some(date),
                uncertainty: Some(DateUncertainty::Before),
                ..Default::default()
            };
        }
    }

    if let Some(caps) = AFTER.captures(text) {
        if let Some(date) = caps[1].parse().ok().and_then(year_start) {
            return ParsedDate {
                date_created: Some(date),
                uncertainty: Some(DateUncertainty::After),
                ..Default::default()
            };
        }
    }

    if let Some(caps) = CENTURY.captures(text) {
        if let Ok(century) = caps[1].parse::<i32>() {
            // "14th century" covers the interval [1301, 1400]
            let start = (century - 1) * 100 + 1;
            let end = century * 100;
            if let (Some(s), Some(e)) = (year_start(start), year_end(end)) {
                return ParsedDate {
                    date_range_start: Some(s),
                    date_range_end: Some(e),
                    uncertainty: Some(DateUncertainty::Century),
                    ..Default::default()
                };
            }
        }
    }

    if let Some(caps) = RANGE.captures(text) {
        let start = caps[1].parse().ok().and_then(year_start);
        let end = caps[2].parse().ok().and_then(year_end);
        if let (Some(s), Some(e)) = (start, end) {
            if s <= e {
                return ParsedDate {
                    date_range_start: Some(s),
                    date_range_end: Some(e),
                    ..Default::default()
                };
            }
        }
    }

    if let Some(caps) = DAY_MONTH_YEAR.captures(text) {
        let day: Option<u32> = caps[1].parse().ok();
        let month = month_number(&caps[2]);
        let year: Option<i32> = caps[3].parse().ok();
        if let (Some(d), Some(m), Some(y)) = (day, month, year) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return ParsedDate {
                    date_created: Some(date),
                    ..Default::default()
                };
            }
        }
    }

    if let Some(caps) = YEAR.captures(text) {
        if let Some(date) = caps[1].parse().ok().and_then(year_start) {
            return ParsedDate {
                date_created: Some(date),
                ..Default::default()
            };
        }
    }

    ParsedDate::default()
}
