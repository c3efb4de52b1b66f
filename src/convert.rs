//! Single-value type detection.
//!
//! [`convert()`] turns one raw textual cell into a typed [`Value`] by trying an
//! ordered table of parser strategies (integer, number, date-time) and taking
//! the first success. Every strategy is a pure `&str -> Option<Value>` function;
//! a failed parse simply hands the value to the next strategy. Anything left
//! unclaimed becomes a string, so non-empty input always converts.
//!
//! Date-time parsing is guided only: it runs when the caller asks for
//! [`Datatype::DateTime`] explicitly and never during unguided inference. It
//! accepts RFC 3339/2822, numeric offsets, a trailing `UTC`/`GMT`/`Z`, ISO and
//! month-first slash dates, 12-hour clock times, and month-name dates such as
//! `Jan 5 2020`. Other zone abbreviations are not understood.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};

use crate::datatype::Datatype;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    /// Integer text too wide for `i64`, kept verbatim.
    WideInteger(String),
    Number(f64),
    /// ISO-8601 text carrying an explicit UTC offset.
    DateTime(String),
    String(String),
}

impl Value {
    pub fn datatype(&self) -> Datatype {
        match self {
            Value::Integer(_) | Value::WideInteger(_) => Datatype::Integer,
            Value::Number(_) => Datatype::Number,
            Value::DateTime(_) => Datatype::DateTime,
            Value::String(_) => Datatype::String,
        }
    }
}

struct ParseStrategy {
    datatype: Datatype,
    guided_only: bool,
    parse: fn(&str) -> Option<Value>,
}

impl ParseStrategy {
    fn enabled_for(&self, override_type: Option<Datatype>) -> bool {
        match override_type {
            Some(requested) => requested == self.datatype,
            None => !self.guided_only,
        }
    }
}

const STRATEGIES: &[ParseStrategy] = &[
    ParseStrategy {
        datatype: Datatype::Integer,
        guided_only: false,
        parse: parse_integer,
    },
    ParseStrategy {
        datatype: Datatype::Number,
        guided_only: false,
        parse: parse_number,
    },
    ParseStrategy {
        datatype: Datatype::DateTime,
        guided_only: true,
        parse: parse_date_time,
    },
];

/// Converts `raw` into a typed value, or `None` when the cell is absent or empty.
///
/// With `override_type` set, only the strategy for that datatype is attempted
/// before falling back to [`Value::String`].
pub fn convert(raw: Option<&str>, override_type: Option<Datatype>) -> Option<Value> {
    let raw = raw.filter(|value| !value.is_empty())?;
    let parsed = STRATEGIES
        .iter()
        .filter(|strategy| strategy.enabled_for(override_type))
        .find_map(|strategy| (strategy.parse)(raw));
    Some(parsed.unwrap_or_else(|| Value::String(raw.to_string())))
}

fn parse_integer(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(Value::Integer(parsed));
    }
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .then(|| Value::WideInteger(trimmed.to_string()))
}

fn parse_number(raw: &str) -> Option<Value> {
    raw.trim().parse::<f64>().ok().map(Value::Number)
}

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%b %d %Y %H:%M:%S",
    "%b %d %Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y%m%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

const UTC_SUFFIXES: &[&str] = &[" UTC", " GMT", "UTC", "Z"];

fn parse_date_time(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    parse_with_offset(trimmed)
        .or_else(|| parse_naive(trimmed))
        .or_else(|| {
            UTC_SUFFIXES
                .iter()
                .filter_map(|suffix| trimmed.strip_suffix(suffix))
                .find_map(|stripped| parse_naive(stripped.trim_end()))
        })
        .map(|parsed| Value::DateTime(format_iso8601(&parsed)))
}

fn parse_with_offset(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
        .or_else(|| {
            OFFSET_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
        })
}

// Values without an offset are taken as UTC.
fn parse_naive(value: &str) -> Option<DateTime<FixedOffset>> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

// Microseconds are printed only when present, offset always as `+HH:MM`.
fn format_iso8601(value: &DateTime<FixedOffset>) -> String {
    if value.nanosecond() == 0 {
        value.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S%.6f%:z").to_string()
    }
}
