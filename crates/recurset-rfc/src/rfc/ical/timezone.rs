//! Timezone offset lookup for iCalendar TZIDs.
//!
//! Normalization never reaches for a global timezone database; callers hand
//! it a [`TimezoneResolver`]. [`ChronoTzResolver`] is backed by `chrono-tz`
//! and uses ICU4X to map Windows and alias identifiers to IANA names;
//! [`FixedOffsetResolver`] is an explicit table for deterministic tests.

use chrono::{DateTime, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

/// Error during timezone conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Unknown, empty or invalid timezone identifier.
    #[error("Unknown timezone: {0:?}")]
    UnknownTimezone(String),

    /// The shifted instant falls outside the representable range.
    #[error("Date-time out of range: {0}")]
    OutOfRange(String),
}

/// Look-up of UTC offsets for TZIDs.
///
/// Implementations must answer consistently for the same `tzid` and instant
/// for at least the duration of one normalization call.
pub trait TimezoneResolver: Send + Sync {
    /// ## Summary
    /// Returns the offset from UTC, in seconds, in force in `tzid` at
    /// `instant`. Positive values are east of Greenwich.
    ///
    /// ## Errors
    /// Returns `ConversionError::UnknownTimezone` if `tzid` cannot be resolved.
    fn offset_for(&self, tzid: &str, instant: DateTime<Utc>) -> Result<i32, ConversionError>;

    /// ## Summary
    /// Converts a wall-clock time in `tzid` to a UTC instant.
    ///
    /// A time repeated by a backward transition resolves to the earlier
    /// instant. A time skipped by a forward transition is read with the
    /// offset in force before the gap, landing the same distance past it.
    ///
    /// ## Errors
    /// Returns an error if `tzid` cannot be resolved or the result is out of
    /// range.
    fn to_utc(&self, tzid: &str, local: NaiveDateTime) -> Result<DateTime<Utc>, ConversionError> {
        let guess = local.and_utc();
        let day = TimeDelta::days(1);
        let before = self.offset_for(tzid, shift(guess, -day)?)?;
        let after = self.offset_for(tzid, shift(guess, day)?)?;

        let mut resolved: Option<DateTime<Utc>> = None;
        for offset in [before, after] {
            let candidate = shift(guess, -TimeDelta::seconds(i64::from(offset)))?;
            if self.offset_for(tzid, candidate)? == offset
                && resolved.is_none_or(|current| candidate < current)
            {
                resolved = Some(candidate);
            }
        }

        match resolved {
            Some(instant) => Ok(instant),
            None => shift(guess, -TimeDelta::seconds(i64::from(before))),
        }
    }

    /// ## Summary
    /// Converts a UTC instant to the wall-clock time in `tzid`.
    ///
    /// ## Errors
    /// Returns an error if `tzid` cannot be resolved or the result is out of
    /// range.
    fn from_utc(&self, tzid: &str, instant: DateTime<Utc>) -> Result<NaiveDateTime, ConversionError> {
        let offset = self.offset_for(tzid, instant)?;
        shift(instant, TimeDelta::seconds(i64::from(offset))).map(|local| local.naive_utc())
    }
}

fn shift(instant: DateTime<Utc>, delta: TimeDelta) -> Result<DateTime<Utc>, ConversionError> {
    instant
        .checked_add_signed(delta)
        .ok_or_else(|| ConversionError::OutOfRange(format!("{instant} shifted by {delta}")))
}

/// Resolver backed by the IANA database compiled into `chrono-tz`.
///
/// Successful resolutions are cached, so one instance can be shared across
/// threads and calls.
#[derive(Debug, Default)]
pub struct ChronoTzResolver {
    /// Caller-supplied TZID to IANA name mappings, consulted first.
    aliases: HashMap<String, String>,
    /// Cache of resolved timezones by raw TZID.
    cache: RwLock<HashMap<String, Tz>>,
}

impl ChronoTzResolver {
    /// Creates a resolver with no aliases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver that maps the given TZIDs to IANA names before
    /// lookup.
    #[must_use]
    pub fn with_aliases(aliases: HashMap<String, String>) -> Self {
        Self {
            aliases,
            cache: RwLock::default(),
        }
    }

    /// ## Summary
    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID is empty or
    /// cannot be resolved.
    pub fn resolve(&self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Ok(cache) = self.cache.read()
            && let Some(tz) = cache.get(tzid)
        {
            return Ok(*tz);
        }

        let trimmed = tzid.trim();
        if trimmed.is_empty() {
            return Err(ConversionError::UnknownTimezone(tzid.to_string()));
        }

        let aliased = self.aliases.get(trimmed).map_or(trimmed, String::as_str);
        let tz = Tz::from_str(aliased)
            .or_else(|_e| Tz::from_str(&normalize_tzid(aliased)))
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;

        tracing::trace!(tzid, resolved = %tz.name(), "Resolved timezone");
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(tzid.to_string(), tz);
        }

        Ok(tz)
    }
}

impl TimezoneResolver for ChronoTzResolver {
    fn offset_for(&self, tzid: &str, instant: DateTime<Utc>) -> Result<i32, ConversionError> {
        let tz = self.resolve(tzid)?;
        Ok(tz
            .offset_from_utc_datetime(&instant.naive_utc())
            .fix()
            .local_minus_utc())
    }
}

/// Normalizes common CalDAV/iCalendar timezone identifiers to IANA names.
///
/// Uses ICU4X for Windows timezone ID mapping and IANA canonicalization.
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);

    let iana_parser = IanaParserExtended::new();

    let windows_parser = WindowsParser::new();
    if let Some(tz) = windows_parser.parse(stripped, None) {
        for entry in iana_parser.iter() {
            if entry.time_zone == tz {
                return entry.canonical.to_string();
            }
        }
    }

    // Handles aliases like Europe/Kiev -> Europe/Kyiv
    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_string()
}

/// Resolver with a fixed offset per TZID and no transitions.
#[derive(Debug, Clone, Default)]
pub struct FixedOffsetResolver {
    offsets: HashMap<String, i32>,
}

impl FixedOffsetResolver {
    /// Creates an empty resolver; every lookup fails until offsets are added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tzid` with a constant offset of `seconds` east of UTC.
    #[must_use]
    pub fn with(mut self, tzid: impl Into<String>, seconds: i32) -> Self {
        self.offsets.insert(tzid.into(), seconds);
        self
    }
}

impl TimezoneResolver for FixedOffsetResolver {
    fn offset_for(&self, tzid: &str, _instant: DateTime<Utc>) -> Result<i32, ConversionError> {
        self.offsets
            .get(tzid)
            .copied()
            .ok_or_else(|| ConversionError::UnknownTimezone(tzid.to_string()))
    }
}
