//! Event component to [`NormalizedRecurrence`].
//!
//! Two passes over the component's properties: the first locates DTSTART
//! and the duration source and turns them into an instant and a duration,
//! the second merges the repeatable RRULE/RDATE/EXRULE/EXDATE occurrences.
//! Nothing is assembled until both passes succeed.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::record::NormalizedRecurrence;
use crate::error::{FormatError, FormatResult};
use crate::rfc::ical::core::{Component, DateTimeValue, Property, PropertyKind};
use crate::rfc::ical::parse::{ParseErrorKind, parse, parse_date_or_datetime};
use crate::rfc::ical::timezone::{ConversionError, TimezoneResolver};

const UTC: &str = "UTC";
const SECONDS_PER_DAY: i64 = 86_400;

/// DTSTART or DTEND resolved to an instant.
#[derive(Debug)]
struct Anchor {
    millis: i64,
    /// `None` for DATE and UTC values.
    tzid: Option<String>,
    all_day: bool,
}

/// ## Summary
/// Normalizes the recurrence metadata of one event component.
///
/// Only the component's own properties are consulted; nested components are
/// ignored.
///
/// ## Errors
/// - `MissingRequiredProperty` if DTSTART is absent, or neither a non-blank
///   DURATION nor DTEND is present.
/// - `UnparseableDateTime` if DTSTART/DTEND does not match its value type.
/// - `UnknownTimezone` if a TZID is empty or unknown to `resolver`.
#[tracing::instrument(skip_all, fields(component = %component.name))]
pub fn normalize(
    component: &Component,
    resolver: &dyn TimezoneResolver,
) -> FormatResult<NormalizedRecurrence> {
    normalize_component(component, resolver)
        .inspect(|record| {
            tracing::debug!(
                dtstart = record.dtstart_millis,
                timezone = %record.timezone,
                duration = %record.duration,
                "Event normalized"
            );
        })
        .inspect_err(|error| tracing::warn!(%error, "Event normalization failed"))
}

/// ## Summary
/// Parses `input` and normalizes every VEVENT in it. If there is none, the
/// top-level properties are normalized as a single event block.
///
/// ## Errors
/// The outer error is a `MalformedLine` for input that does not parse. Each
/// event's own failure is reported in its slot of the returned list.
pub fn normalize_all(
    input: &str,
    resolver: &dyn TimezoneResolver,
) -> FormatResult<Vec<FormatResult<NormalizedRecurrence>>> {
    let root = parse(input)?;
    let events = root.events();

    if events.is_empty() {
        tracing::debug!("No VEVENT found, normalizing input as one block");
        return Ok(vec![normalize(&root, resolver)]);
    }

    tracing::debug!(count = events.len(), "Normalizing events");
    Ok(events
        .into_iter()
        .map(|event| normalize(event, resolver))
        .collect())
}

fn normalize_component(
    component: &Component,
    resolver: &dyn TimezoneResolver,
) -> FormatResult<NormalizedRecurrence> {
    // Pass 1: start and duration.
    let dtstart = component
        .first_of(PropertyKind::DtStart)
        .ok_or_else(|| FormatError::MissingRequiredProperty("DTSTART".to_string()))?;
    let start = resolve_anchor(dtstart, None, resolver)?;
    let duration = derive_duration(component, &start, resolver)?;

    // Pass 2: repeatable properties.
    let rrule = merge_rules(component, PropertyKind::RRule);
    let exrule = merge_rules(component, PropertyKind::ExRule);
    let rdate = merge_dates(component, PropertyKind::RDate);
    let exdate = merge_dates(component, PropertyKind::ExDate);

    Ok(NormalizedRecurrence {
        rrule,
        rdate,
        exrule,
        exdate,
        dtstart_millis: start.millis,
        timezone: start.tzid.unwrap_or_else(|| UTC.to_string()),
        duration,
        all_day: start.all_day,
    })
}

/// DURATION wins verbatim; otherwise the difference DTEND - DTSTART.
///
/// A blank DURATION counts as absent. A DTEND before a timed DTSTART gives a
/// negative duration written `-P<n>S`; all-day durations never drop below
/// `P1D`.
fn derive_duration(
    component: &Component,
    start: &Anchor,
    resolver: &dyn TimezoneResolver,
) -> FormatResult<String> {
    if let Some(duration) = component
        .first_of(PropertyKind::Duration)
        .filter(|duration| !duration.value.trim().is_empty())
    {
        return Ok(duration.value.clone());
    }

    let dtend = component.first_of(PropertyKind::DtEnd).ok_or_else(|| {
        FormatError::MissingRequiredProperty("DURATION or DTEND".to_string())
    })?;
    // A floating DTEND is read in the start's zone.
    let end = resolve_anchor(dtend, start.tzid.as_deref(), resolver)?;

    let seconds = (end.millis - start.millis) / 1000;
    Ok(if start.all_day {
        format!("P{}D", (seconds / SECONDS_PER_DAY).max(1))
    } else if seconds < 0 {
        format!("-P{}S", seconds.unsigned_abs())
    } else {
        format!("P{seconds}S")
    })
}

/// Resolves a DTSTART/DTEND property to an instant.
///
/// `VALUE=DATE` is midnight UTC whatever the TZID. A `Z` suffix is UTC even
/// with a TZID. A local time uses its TZID, else `floating_tzid`, else UTC.
fn resolve_anchor(
    prop: &Property,
    floating_tzid: Option<&str>,
    resolver: &dyn TimezoneResolver,
) -> FormatResult<Anchor> {
    let value = parse_date_or_datetime(prop.value.trim(), prop.is_date_only())
        .map_err(|reason| unparseable(prop, reason))?;

    match value {
        DateTimeValue::Date(_) => Ok(Anchor {
            millis: value.naive().and_utc().timestamp_millis(),
            tzid: None,
            all_day: true,
        }),
        DateTimeValue::Local(local) => match prop.tzid().or(floating_tzid) {
            Some(tzid) => Ok(Anchor {
                millis: local_to_millis(prop, tzid, local, resolver)?,
                tzid: Some(tzid.to_string()),
                all_day: false,
            }),
            None => Ok(utc_anchor(local)),
        },
        DateTimeValue::Utc(utc) => Ok(utc_anchor(utc)),
    }
}

fn utc_anchor(utc: NaiveDateTime) -> Anchor {
    Anchor {
        millis: utc.and_utc().timestamp_millis(),
        tzid: None,
        all_day: false,
    }
}

fn local_to_millis(
    prop: &Property,
    tzid: &str,
    local: NaiveDateTime,
    resolver: &dyn TimezoneResolver,
) -> FormatResult<i64> {
    if tzid.trim().is_empty() {
        return Err(FormatError::UnknownTimezone(tzid.to_string()));
    }

    let instant: DateTime<Utc> = resolver.to_utc(tzid, local).map_err(|e| match e {
        ConversionError::UnknownTimezone(name) => FormatError::UnknownTimezone(name),
        ConversionError::OutOfRange(_) => unparseable(prop, ParseErrorKind::InvalidDateTime),
    })?;
    tracing::trace!(property = %prop.name, tzid, %local, %instant, "Converted to UTC");
    Ok(instant.timestamp_millis())
}

fn unparseable(prop: &Property, reason: ParseErrorKind) -> FormatError {
    FormatError::UnparseableDateTime {
        property: prop.name.clone(),
        value: prop.value.clone(),
        reason,
    }
}

/// Joins every occurrence's raw value in source order.
fn merge_rules(component: &Component, kind: PropertyKind) -> Option<String> {
    join_lines(component.properties_of(kind).map(|prop| prop.value.clone()))
}

/// Encodes each occurrence as `<tzid>;<values>` or `<values>` and joins them
/// in source order.
fn merge_dates(component: &Component, kind: PropertyKind) -> Option<String> {
    join_lines(component.properties_of(kind).map(|prop| match prop.tzid() {
        Some(tzid) => format!("{tzid};{}", prop.value),
        None => prop.value.clone(),
    }))
}

fn join_lines(values: impl Iterator<Item = String>) -> Option<String> {
    let values: Vec<String> = values.collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::timezone::FixedOffsetResolver;

    fn resolver() -> FixedOffsetResolver {
        FixedOffsetResolver::new()
            .with("Test/Minus5", -5 * 3600)
            .with("Test/Plus2", 2 * 3600)
    }

    fn run(block: &str) -> FormatResult<NormalizedRecurrence> {
        normalize(&parse(block).unwrap(), &resolver())
    }

    #[test]
    fn missing_dtstart() {
        assert_eq!(
            run("DURATION:PT1H\nRRULE:FREQ=DAILY"),
            Err(FormatError::MissingRequiredProperty("DTSTART".to_string()))
        );
    }

    #[test]
    fn missing_duration_source() {
        assert!(matches!(
            run("DTSTART:20090821T000000Z\nRRULE:FREQ=DAILY"),
            Err(FormatError::MissingRequiredProperty(_))
        ));
    }

    #[test]
    fn blank_duration_counts_as_absent() {
        assert_eq!(
            run("DTSTART:20090821T000000Z\nDURATION:"),
            Err(FormatError::MissingRequiredProperty(
                "DURATION or DTEND".to_string()
            ))
        );
        let record =
            run("DTSTART:20090821T000000Z\nDURATION: \nDTEND:20090821T010000Z").unwrap();
        assert_eq!(record.duration, "P3600S");
    }

    #[test]
    fn floating_start_is_utc() {
        let record = run("DTSTART:20090821T000000\nDURATION:PT1H").unwrap();
        assert_eq!(record.dtstart_millis, 1_250_812_800_000);
        assert_eq!(record.timezone, "UTC");
        assert!(!record.all_day);
    }

    #[test]
    fn utc_suffix_beats_tzid() {
        let record = run("DTSTART;TZID=Test/Plus2:20090821T000000Z\nDURATION:PT1H").unwrap();
        assert_eq!(record.dtstart_millis, 1_250_812_800_000);
        assert_eq!(record.timezone, "UTC");
    }

    #[test]
    fn date_value_ignores_tzid() {
        let record =
            run("DTSTART;VALUE=DATE;TZID=Test/Plus2:20090821\nDTEND;VALUE=DATE:20090821").unwrap();
        assert_eq!(record.dtstart_millis, 1_250_812_800_000);
        assert_eq!(record.timezone, "UTC");
        assert!(record.all_day);
        // Same-day end still spans one day.
        assert_eq!(record.duration, "P1D");
    }

    #[test]
    fn date_without_value_param_is_unparseable() {
        assert!(matches!(
            run("DTSTART:20090821\nDURATION:P1D"),
            Err(FormatError::UnparseableDateTime { ref property, .. }) if property == "DTSTART"
        ));
    }

    #[test]
    fn bad_widths_are_unparseable() {
        assert!(matches!(
            run("DTSTART;VALUE=DATE:2009082\nDURATION:P1D"),
            Err(FormatError::UnparseableDateTime { .. })
        ));
        assert!(matches!(
            run("DTSTART:20090821T0000Z\nDURATION:P1D"),
            Err(FormatError::UnparseableDateTime { .. })
        ));
        assert!(matches!(
            run("DTSTART:20090821T000000Z\nDTEND:tomorrow"),
            Err(FormatError::UnparseableDateTime { ref property, .. }) if property == "DTEND"
        ));
    }

    #[test]
    fn unknown_and_empty_tzid() {
        assert_eq!(
            run("DTSTART;TZID=Nowhere/Land:20090821T000000\nDURATION:PT1H"),
            Err(FormatError::UnknownTimezone("Nowhere/Land".to_string()))
        );
        assert_eq!(
            run("DTSTART;TZID=:20090821T000000\nDURATION:PT1H"),
            Err(FormatError::UnknownTimezone(String::new()))
        );
    }

    #[test]
    fn unknown_end_tzid() {
        assert_eq!(
            run("DTSTART:20090821T000000Z\nDTEND;TZID=Nowhere/Land:20090821T010000"),
            Err(FormatError::UnknownTimezone("Nowhere/Land".to_string()))
        );
    }

    #[test]
    fn floating_end_uses_start_zone() {
        let record =
            run("DTSTART;TZID=Test/Minus5:20090821T070000\nDTEND:20090821T080000").unwrap();
        assert_eq!(record.duration, "P3600S");
    }

    #[test]
    fn negative_duration() {
        let record = run("DTSTART:20090821T010000Z\nDTEND:20090821T000000Z").unwrap();
        assert_eq!(record.duration, "-P3600S");
    }

    #[test]
    fn all_day_duration_truncates_to_days() {
        let record = run("DTSTART;VALUE=DATE:20090821\nDTEND:20090823T120000Z").unwrap();
        assert_eq!(record.duration, "P2D");
    }

    #[test]
    fn absent_rules_are_none_not_empty() {
        let record = run("DTSTART:20090821T000000Z\nDURATION:PT1H").unwrap();
        assert_eq!(record.rrule, None);
        assert_eq!(record.rdate, None);
        assert_eq!(record.exrule, None);
        assert_eq!(record.exdate, None);
    }

    #[test]
    fn exrule_merges_like_rrule() {
        let record = run(
            "DTSTART:20090821T000000Z\nDURATION:PT1H\nEXRULE:FREQ=WEEKLY\nEXRULE:FREQ=MONTHLY",
        )
        .unwrap();
        assert_eq!(record.exrule.as_deref(), Some("FREQ=WEEKLY\nFREQ=MONTHLY"));
    }

    #[test]
    fn multiple_dates_keep_each_tzid() {
        let record = run(
            "DTSTART:20090821T000000Z\nDURATION:PT1H\n\
             EXDATE;TZID=Test/Plus2:20090822T000000,20090823T000000\n\
             EXDATE:20090901T000000Z",
        )
        .unwrap();
        assert_eq!(
            record.exdate.as_deref(),
            Some("Test/Plus2;20090822T000000,20090823T000000\n20090901T000000Z")
        );
    }

    #[test]
    fn nested_components_are_ignored() {
        let record = run(
            "DTSTART:20090821T000000Z\nDURATION:PT1H\n\
             BEGIN:VALARM\nDURATION:PT15M\nTRIGGER:-PT15M\nEND:VALARM",
        )
        .unwrap();
        assert_eq!(record.duration, "PT1H");
    }

    #[test]
    fn normalize_all_falls_back_to_bare_block() {
        let results = normalize_all("DTSTART:20090821T000000Z\nDURATION:PT1H", &resolver()).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[test]
    fn normalize_all_reports_each_event() {
        let input = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nDTSTART:20090821T000000Z\nDURATION:PT1H\n\
                     END:VEVENT\nBEGIN:VEVENT\nDURATION:PT1H\nEND:VEVENT\nEND:VCALENDAR";
        let results = normalize_all(input, &resolver()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(FormatError::MissingRequiredProperty(_))
        ));
    }

    #[test]
    fn normalize_all_rejects_malformed_input() {
        assert!(matches!(
            normalize_all("DTSTART:20090821T000000Z\nDURATION", &resolver()),
            Err(FormatError::MalformedLine(_))
        ));
    }
}
