//! DATE and DATE-TIME values (RFC 5545 §3.3.4, §3.3.5).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// A DATE or DATE-TIME value in one of its three wire forms.
///
/// The TZID that qualifies a [`DateTimeValue::Local`] lives on the property,
/// not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeValue {
    /// `YYYYMMDD`
    Date(NaiveDate),
    /// `YYYYMMDDTHHMMSSZ`
    Utc(NaiveDateTime),
    /// `YYYYMMDDTHHMMSS`, floating or qualified by a TZID parameter.
    Local(NaiveDateTime),
}

impl DateTimeValue {
    /// Returns the wall-clock date-time; dates are taken at midnight.
    #[must_use]
    pub fn naive(self) -> NaiveDateTime {
        match self {
            Self::Date(date) => date.and_time(chrono::NaiveTime::MIN),
            Self::Utc(dt) | Self::Local(dt) => dt,
        }
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y%m%d")),
            Self::Utc(dt) => write!(f, "{}", dt.format("%Y%m%dT%H%M%SZ")),
            Self::Local(dt) => write!(f, "{}", dt.format("%Y%m%dT%H%M%S")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .unwrap()
    }

    #[test]
    fn display_forms() {
        let date = NaiveDate::from_ymd_opt(2009, 8, 21).unwrap();
        assert_eq!(DateTimeValue::Date(date).to_string(), "20090821");
        assert_eq!(
            DateTimeValue::Utc(at(2008, 2, 22, 12, 0, 0)).to_string(),
            "20080222T120000Z"
        );
        assert_eq!(
            DateTimeValue::Local(at(2009, 8, 21, 1, 2, 3)).to_string(),
            "20090821T010203"
        );
    }

    #[test]
    fn date_is_midnight() {
        let date = NaiveDate::from_ymd_opt(2009, 8, 21).unwrap();
        assert_eq!(DateTimeValue::Date(date).naive(), at(2009, 8, 21, 0, 0, 0));
    }
}
