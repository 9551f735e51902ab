//! DATE and DATE-TIME value parsers (RFC 5545 §3.3.4, §3.3.5).
//!
//! These work on a single property value and know nothing about line
//! positions, so they report a bare [`ParseErrorKind`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::error::ParseErrorKind;
use crate::rfc::ical::core::DateTimeValue;

fn digits<T: std::str::FromStr>(s: &str, kind: ParseErrorKind) -> Result<T, ParseErrorKind> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(kind);
    }
    s.parse::<T>().map_err(|_e| kind)
}

/// Parses a DATE value.
///
/// Format: YYYYMMDD (e.g., "19970714")
///
/// ## Errors
/// Returns `InvalidDate` if the string is not 8 digits naming a real date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseErrorKind> {
    if s.len() != 8 || !s.is_ascii() {
        return Err(ParseErrorKind::InvalidDate);
    }

    let year = digits::<i32>(&s[0..4], ParseErrorKind::InvalidDate)?;
    let month = digits::<u32>(&s[4..6], ParseErrorKind::InvalidDate)?;
    let day = digits::<u32>(&s[6..8], ParseErrorKind::InvalidDate)?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(ParseErrorKind::InvalidDate)
}

/// Parses a TIME value without its optional UTC marker.
///
/// Format: HHMMSS (e.g., "133000")
///
/// ## Errors
/// Returns `InvalidTime` if the string is not 6 digits naming a valid time.
/// A leap second (`60`) is clamped to `59`.
pub fn parse_time(s: &str) -> Result<NaiveTime, ParseErrorKind> {
    if s.len() != 6 || !s.is_ascii() {
        return Err(ParseErrorKind::InvalidTime);
    }

    let hour = digits::<u32>(&s[0..2], ParseErrorKind::InvalidTime)?;
    let minute = digits::<u32>(&s[2..4], ParseErrorKind::InvalidTime)?;
    let second = digits::<u32>(&s[4..6], ParseErrorKind::InvalidTime)?;
    if second > 60 {
        return Err(ParseErrorKind::InvalidTime);
    }

    NaiveTime::from_hms_opt(hour, minute, second.min(59)).ok_or(ParseErrorKind::InvalidTime)
}

/// Parses a DATE-TIME value.
///
/// Format: YYYYMMDD"T"HHMMSS[Z] (e.g., "19970714T133000Z")
///
/// ## Errors
/// Returns `InvalidDateTime` if the `T` separator is missing, otherwise the
/// date or time error of the offending half.
pub fn parse_datetime(s: &str) -> Result<DateTimeValue, ParseErrorKind> {
    let (date_str, time_str) = s.split_once('T').ok_or(ParseErrorKind::InvalidDateTime)?;

    let (time_str, is_utc) = match time_str.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (time_str, false),
    };

    let naive = NaiveDateTime::new(parse_date(date_str)?, parse_time(time_str)?);
    Ok(if is_utc {
        DateTimeValue::Utc(naive)
    } else {
        DateTimeValue::Local(naive)
    })
}

/// Parses a DTSTART/DTEND-style value according to its `VALUE` parameter.
///
/// ## Errors
/// Returns the error of [`parse_date`] when `date_only`, otherwise that of
/// [`parse_datetime`].
pub fn parse_date_or_datetime(s: &str, date_only: bool) -> Result<DateTimeValue, ParseErrorKind> {
    if date_only {
        parse_date(s).map(DateTimeValue::Date)
    } else {
        parse_datetime(s)
    }
}
