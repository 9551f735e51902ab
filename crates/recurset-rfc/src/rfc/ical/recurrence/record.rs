//! Storage record produced by normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical recurrence metadata for one event.
///
/// Serializes to the flat storage keys `rrule`, `rdate`, `exrule`, `exdate`,
/// `dtstart`, `eventTimezone`, `duration` and `allDay`; absent optional
/// fields are written as `null` and `allDay` as `0`/`1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecurrence {
    /// RRULE values in source order, newline-joined.
    pub rrule: Option<String>,
    /// RDATE values, one `[<tzid>;]<dates>` entry per occurrence,
    /// newline-joined.
    pub rdate: Option<String>,
    /// EXRULE values in source order, newline-joined.
    pub exrule: Option<String>,
    /// EXDATE values, encoded like `rdate`.
    pub exdate: Option<String>,
    /// Start instant in milliseconds since the Unix epoch.
    #[serde(rename = "dtstart")]
    pub dtstart_millis: i64,
    /// `"UTC"` for all-day or UTC events, otherwise the DTSTART TZID.
    #[serde(rename = "eventTimezone")]
    pub timezone: String,
    /// ISO-8601 duration.
    pub duration: String,
    /// Whether DTSTART is a DATE value.
    #[serde(rename = "allDay", with = "int_flag")]
    pub all_day: bool,
}

impl NormalizedRecurrence {
    /// Returns whether the record describes a recurring event, i.e. it has
    /// an RRULE or an RDATE.
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.rrule.is_some() || self.rdate.is_some()
    }

    /// Returns the start as a UTC instant, or `None` if the millisecond
    /// value is out of range.
    #[must_use]
    pub fn dtstart(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.dtstart_millis)
    }
}

/// `bool` stored as an integer column.
mod int_flag {
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[expect(clippy::trivially_copy_pass_by_ref, reason = "signature fixed by serde")]
    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Unsigned(u64::from(other)),
                &"0 or 1",
            )),
        }
    }
}
