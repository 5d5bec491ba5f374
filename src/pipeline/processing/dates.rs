//! Free-text date resolution for table cells.
//!
//! Cells read like "December 31, 2017", "5 March 2017", "March 1–3, 2017" or
//! "January 1, 2018 12:00 am". Only the earliest date in the text is used, an
//! optional clock time may follow it, and a date without a time resolves to
//! noon. Text without a recognizable day and year is [`ParsedDate::Unparseable`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::PRE_2018_BOUNDARY_TEXT;
use crate::error::{Result, ScraperError};
use crate::pipeline::processing::text::strip_citations;

const MONTH_NAMES: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";
const ORDINAL: &str = "(?:st|nd|rd|th)?";

static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)\b({MONTH_NAMES})\.?\s+(\d{{1,2}}){ORDINAL}(?:\s*-\s*(?:(?:{MONTH_NAMES})\.?\s+)?\d{{1,2}}{ORDINAL})?,?\s+(\d{{4}})\b"
    ))
});
static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)\b(\d{{1,2}}){ORDINAL}(?:\s*-\s*\d{{1,2}}{ORDINAL})?\s+({MONTH_NAMES})\.?,?\s+(\d{{4}})\b"
    ))
});
static ISO_DATE: Lazy<Regex> = Lazy::new(|| compile(r"\b(\d{4})-(\d{1,2})-(\d{1,2})"));
static US_SLASH_DATE: Lazy<Regex> = Lazy::new(|| compile(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b"));
static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(?i)\b({MONTH_NAMES})\.?,?\s+(\d{{4}})\b")));

static TIME_MERIDIEM: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^\s*,?\s*(?:at\s+)?(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s?m\b\.?")
});
static TIME_24H: Lazy<Regex> =
    Lazy::new(|| compile(r"^(?:\s*,?\s*(?:at\s+)?|T)(\d{1,2}):(\d{2})(?::(\d{2}))?"));
static TIME_WORD: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)^\s*,?\s*(?:at\s+)?(noon|midnight)\b"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("date pattern is valid")
}

/// Outcome of resolving a date cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParsedDate {
    /// A local wall-clock instant
    Resolved(NaiveDateTime),
    /// The text carried no recognizable date
    Unparseable,
}

impl ParsedDate {
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            ParsedDate::Resolved(dt) => Some(*dt),
            ParsedDate::Unparseable => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ParsedDate::Resolved(_))
    }

    /// Strictly earlier than `boundary`. Unparseable dates are never earlier.
    pub fn is_before(&self, boundary: NaiveDateTime) -> bool {
        match self {
            ParsedDate::Resolved(dt) => *dt < boundary,
            ParsedDate::Unparseable => false,
        }
    }
}

impl From<Option<NaiveDateTime>> for ParsedDate {
    fn from(value: Option<NaiveDateTime>) -> Self {
        value.map_or(ParsedDate::Unparseable, ParsedDate::Resolved)
    }
}

// Serialized as an ISO local date-time string, or null when unparseable
impl Serialize for ParsedDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_datetime().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParsedDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Option::<NaiveDateTime>::deserialize(deserializer)?.into())
    }
}

/// Turns free-text date cells into comparable values
#[derive(Debug, Clone, Default)]
pub struct DateResolver;

impl DateResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the first date found in `text`.
    pub fn resolve(&self, text: &str) -> ParsedDate {
        let prepared = prepare(text);
        match find_date(&prepared) {
            Some((date, end)) => find_time(&prepared[end..])
                .map(|time| date.and_time(time))
                .or_else(|| date.and_hms_opt(12, 0, 0))
                .into(),
            None => ParsedDate::Unparseable,
        }
    }

    /// The instant pre-2018 rows must precede. Resolve it once and reuse it.
    pub fn epoch_boundary(&self) -> Result<NaiveDateTime> {
        self.resolve(PRE_2018_BOUNDARY_TEXT)
            .as_datetime()
            .ok_or_else(|| ScraperError::InvalidDate(PRE_2018_BOUNDARY_TEXT.to_string()))
    }
}

/// Drop footnote markers, fold dashes and collapse whitespace
fn prepare(text: &str) -> String {
    strip_citations(text)
        .replace(['\u{2013}', '\u{2014}', '\u{2212}'], "-")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn build_date(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}

/// A date found in the text, with the byte span it covers
struct DateMatch {
    start: usize,
    end: usize,
    date: NaiveDate,
}

fn first_match(
    pattern: &Regex,
    text: &str,
    build: impl Fn(&Captures<'_>) -> Option<NaiveDate>,
) -> Option<DateMatch> {
    let caps = pattern.captures(text)?;
    let whole = caps.get(0)?;
    Some(DateMatch { start: whole.start(), end: whole.end(), date: build(&caps)? })
}

/// Earliest date in the text and the byte offset just past it. Layouts are
/// tried in order, so on a tie the earlier layout wins.
fn find_date(text: &str) -> Option<(NaiveDate, usize)> {
    [
        first_match(&MONTH_DAY_YEAR, text, |caps| {
            build_date(&caps[3], month_number(&caps[1])?, &caps[2])
        }),
        first_match(&DAY_MONTH_YEAR, text, |caps| {
            build_date(&caps[3], month_number(&caps[2])?, &caps[1])
        }),
        first_match(&ISO_DATE, text, |caps| {
            build_date(&caps[1], caps[2].parse().ok()?, &caps[3])
        }),
        first_match(&US_SLASH_DATE, text, |caps| {
            build_date(&caps[3], caps[1].parse().ok()?, &caps[2])
        }),
        first_match(&MONTH_YEAR, text, |caps| build_date(&caps[2], month_number(&caps[1])?, "1")),
    ]
    .into_iter()
    .flatten()
    .min_by_key(|found| found.start)
    .map(|found| (found.date, found.end))
}

/// Clock time directly following a date, if any
fn find_time(rest: &str) -> Option<NaiveTime> {
    if let Some(caps) = TIME_MERIDIEM.captures(rest) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps[3].eq_ignore_ascii_case("p");
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if let Some(caps) = TIME_24H.captures(rest) {
        let second: u32 = match caps.get(3) {
            Some(s) => s.as_str().parse().ok()?,
            None => 0,
        };
        return NaiveTime::from_hms_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, second);
    }

    let caps = TIME_WORD.captures(rest)?;
    if caps[1].eq_ignore_ascii_case("noon") {
        NaiveTime::from_hms_opt(12, 0, 0)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> ParsedDate {
        ParsedDate::Resolved(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_month_day_year_defaults_to_noon() {
        let resolver = DateResolver::new();
        assert_eq!(resolver.resolve("December 31, 2017"), at(2017, 12, 31, 12, 0));
        assert_eq!(resolver.resolve("Dec. 31 2017"), at(2017, 12, 31, 12, 0));
        assert_eq!(resolver.resolve("Sept 4th, 2018"), at(2018, 9, 4, 12, 0));
    }

    #[test]
    fn test_meridiem_times() {
        let resolver = DateResolver::new();
        assert_eq!(resolver.resolve("January 1, 2018 12:00 am"), at(2018, 1, 1, 0, 0));
        assert_eq!(resolver.resolve("January 1, 2018 12:00 pm"), at(2018, 1, 1, 12, 0));
        assert_eq!(resolver.resolve("March 3, 2019 at 9:15 p.m."), at(2019, 3, 3, 21, 15));
        assert_eq!(resolver.resolve("March 3, 2019 7am"), at(2019, 3, 3, 7, 0));
    }

    #[test]
    fn test_24_hour_and_word_times() {
        let resolver = DateResolver::new();
        assert_eq!(resolver.resolve("2018-01-01 00:00"), at(2018, 1, 1, 0, 0));
        assert_eq!(resolver.resolve("2018-01-01T18:30:00"), at(2018, 1, 1, 18, 30));
        assert_eq!(resolver.resolve("June 5, 2016 midnight"), at(2016, 6, 5, 0, 0));
    }

    #[test]
    fn test_other_layouts() {
        let resolver = DateResolver::new();
        assert_eq!(resolver.resolve("5 March 2017"), at(2017, 3, 5, 12, 0));
        assert_eq!(resolver.resolve("12/31/2017"), at(2017, 12, 31, 12, 0));
        assert_eq!(resolver.resolve("March 2017"), at(2017, 3, 1, 12, 0));
    }

    #[test]
    fn test_ranges_and_citations_use_first_day() {
        let resolver = DateResolver::new();
        assert_eq!(resolver.resolve("March 1\u{2013}3, 2017"), at(2017, 3, 1, 12, 0));
        assert_eq!(resolver.resolve("April 20, 1999[1][2]"), at(1999, 4, 20, 12, 0));
        assert_eq!(
            resolver.resolve("December 31, 2017 \u{2013} January 1, 2018"),
            at(2017, 12, 31, 12, 0)
        );
    }

    #[test]
    fn test_range_naming_two_months_uses_first_day() {
        let resolver = DateResolver::new();
        assert_eq!(resolver.resolve("March 31 \u{2013} April 2, 2017"), at(2017, 3, 31, 12, 0));
        assert_eq!(resolver.resolve("June 29 - Jul. 1, 2018"), at(2018, 6, 29, 12, 0));
    }

    #[test]
    fn test_earliest_date_wins_across_layouts() {
        let resolver = DateResolver::new();
        assert_eq!(
            resolver.resolve("31 December 2017 \u{2013} January 2, 2018"),
            at(2017, 12, 31, 12, 0)
        );
        assert_eq!(resolver.resolve("12/30/2017 or January 2, 2018"), at(2017, 12, 30, 12, 0));
        assert_eq!(resolver.resolve("2017-06-01, reported June 3, 2017"), at(2017, 6, 1, 12, 0));
    }

    #[test]
    fn test_unparseable_text() {
        let resolver = DateResolver::new();
        assert_eq!(resolver.resolve(""), ParsedDate::Unparseable);
        assert_eq!(resolver.resolve("Unknown"), ParsedDate::Unparseable);
        assert_eq!(resolver.resolve("2017"), ParsedDate::Unparseable);
        assert_eq!(resolver.resolve("February 30, 2017"), ParsedDate::Unparseable);
    }

    #[test]
    fn test_epoch_boundary_is_midnight_new_year_2018() {
        let boundary = DateResolver::new().epoch_boundary().unwrap();
        assert_eq!(
            boundary,
            NaiveDate::from_ymd_opt(2018, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_is_before_is_strict() {
        let resolver = DateResolver::new();
        let boundary = resolver.epoch_boundary().unwrap();
        assert!(resolver.resolve("December 31, 2017").is_before(boundary));
        assert!(!resolver.resolve("January 1, 2018 12:00 am").is_before(boundary));
        assert!(!ParsedDate::Unparseable.is_before(boundary));
    }

    #[test]
    fn test_serializes_as_iso_string_or_null() {
        let resolved = DateResolver::new().resolve("December 31, 2017");
        assert_eq!(serde_json::to_value(resolved).unwrap(), serde_json::json!("2017-12-31T12:00:00"));
        assert_eq!(
            serde_json::to_value(ParsedDate::Unparseable).unwrap(),
            serde_json::Value::Null
        );

        let back: ParsedDate = serde_json::from_value(serde_json::json!("2017-12-31T12:00:00")).unwrap();
        assert_eq!(back, resolved);
    }
}
