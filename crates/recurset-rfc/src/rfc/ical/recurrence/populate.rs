//! [`NormalizedRecurrence`] back to an event component.

use super::record::NormalizedRecurrence;
use crate::error::{FormatError, FormatResult};
use crate::rfc::ical::core::{Component, DateTimeValue, Parameter, Property, PropertyKind};
use crate::rfc::ical::parse::ParseErrorKind;
use crate::rfc::ical::timezone::{ConversionError, TimezoneResolver};

/// ## Summary
/// Rebuilds a VEVENT carrying DTSTART, DURATION and the recurrence
/// properties of `record`.
///
/// Each newline-separated rule or date entry becomes its own property. A
/// `<tzid>;` prefix on a date entry becomes a TZID parameter, and entries
/// without a time part get `VALUE=DATE`.
///
/// ## Errors
/// - `MissingRequiredProperty` if the record has neither RRULE nor RDATE, or
///   its duration is blank.
/// - `UnparseableDateTime` if the start instant is out of range.
/// - `UnknownTimezone` if the record's timezone is unknown to `resolver`.
pub fn to_component(
    record: &NormalizedRecurrence,
    resolver: &dyn TimezoneResolver,
) -> FormatResult<Component> {
    if !record.is_recurring() {
        return Err(FormatError::MissingRequiredProperty(
            "RRULE or RDATE".to_string(),
        ));
    }

    if record.duration.trim().is_empty() {
        return Err(FormatError::MissingRequiredProperty("DURATION".to_string()));
    }

    let mut event = Component::event();
    event.add_property(dtstart_property(record, resolver)?);
    event.add_property(Property::new("DURATION", record.duration.as_str()));

    add_rules(&mut event, PropertyKind::RRule, record.rrule.as_deref());
    add_dates(&mut event, PropertyKind::RDate, record.rdate.as_deref());
    add_rules(&mut event, PropertyKind::ExRule, record.exrule.as_deref());
    add_dates(&mut event, PropertyKind::ExDate, record.exdate.as_deref());

    tracing::debug!(
        properties = event.properties.len(),
        "Rebuilt event from record"
    );
    Ok(event)
}

fn dtstart_property(
    record: &NormalizedRecurrence,
    resolver: &dyn TimezoneResolver,
) -> FormatResult<Property> {
    let out_of_range = || FormatError::UnparseableDateTime {
        property: "DTSTART".to_string(),
        value: record.dtstart_millis.to_string(),
        reason: ParseErrorKind::InvalidDateTime,
    };
    let instant = record.dtstart().ok_or_else(out_of_range)?;

    if record.all_day {
        return Ok(Property::with_params(
            "DTSTART",
            vec![Parameter::value_type("DATE")],
            DateTimeValue::Date(instant.date_naive()).to_string(),
        ));
    }

    if record.timezone.eq_ignore_ascii_case("UTC") {
        return Ok(Property::new(
            "DTSTART",
            DateTimeValue::Utc(instant.naive_utc()).to_string(),
        ));
    }

    let local = resolver
        .from_utc(&record.timezone, instant)
        .map_err(|e| match e {
            ConversionError::UnknownTimezone(name) => FormatError::UnknownTimezone(name),
            ConversionError::OutOfRange(_) => out_of_range(),
        })?;
    Ok(Property::with_params(
        "DTSTART",
        vec![Parameter::tzid(record.timezone.as_str())],
        DateTimeValue::Local(local).to_string(),
    ))
}

fn add_rules(event: &mut Component, kind: PropertyKind, merged: Option<&str>) {
    let (Some(name), Some(merged)) = (kind.as_str(), merged) else {
        return;
    };
    for rule in merged.split('\n').filter(|rule| !rule.is_empty()) {
        event.add_property(Property::new(name, rule));
    }
}

fn add_dates(event: &mut Component, kind: PropertyKind, merged: Option<&str>) {
    let (Some(name), Some(merged)) = (kind.as_str(), merged) else {
        return;
    };
    for entry in merged.split('\n').filter(|entry| !entry.is_empty()) {
        let (tzid, values) = match entry.split_once(';') {
            Some((tzid, values)) => (Some(tzid), values),
            None => (None, entry),
        };

        let mut params = Vec::new();
        if values.split(',').all(|value| !value.contains('T')) {
            params.push(Parameter::value_type("DATE"));
        }
        if let Some(tzid) = tzid {
            params.push(Parameter::tzid(tzid));
        }
        event.add_property(Property::with_params(name, params, values));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::timezone::FixedOffsetResolver;

    fn record() -> NormalizedRecurrence {
        NormalizedRecurrence {
            rrule: Some("FREQ=YEARLY;WKST=SU\nFREQ=MONTHLY;COUNT=3".to_string()),
            rdate: Some("Test/Minus7;20110601,20110602".to_string()),
            exrule: None,
            exdate: Some("20090901T000000Z".to_string()),
            dtstart_millis: 1_250_841_723_000,
            timezone: "Test/Minus7".to_string(),
            duration: "P2H".to_string(),
            all_day: false,
        }
    }

    fn resolver() -> FixedOffsetResolver {
        FixedOffsetResolver::new().with("Test/Minus7", -7 * 3600)
    }

    fn values(event: &Component, name: &str) -> Vec<String> {
        event
            .get_properties(name)
            .into_iter()
            .map(|p| p.value.clone())
            .collect()
    }

    #[test]
    fn splits_rules_and_dates() {
        let event = to_component(&record(), &resolver()).unwrap();

        assert_eq!(
            values(&event, "RRULE"),
            vec!["FREQ=YEARLY;WKST=SU", "FREQ=MONTHLY;COUNT=3"]
        );
        assert!(event.get_property("EXRULE").is_none());

        let rdate = event.get_property("RDATE").unwrap();
        assert_eq!(rdate.tzid(), Some("Test/Minus7"));
        assert!(rdate.is_date_only());
        assert_eq!(rdate.value, "20110601,20110602");

        let exdate = event.get_property("EXDATE").unwrap();
        assert!(exdate.params.is_empty());
        assert_eq!(exdate.value, "20090901T000000Z");

        assert_eq!(values(&event, "DURATION"), vec!["P2H"]);
    }

    #[test]
    fn dtstart_in_zone() {
        let event = to_component(&record(), &resolver()).unwrap();
        let dtstart = event.get_property("DTSTART").unwrap();
        assert_eq!(dtstart.tzid(), Some("Test/Minus7"));
        assert_eq!(dtstart.value, "20090821T010203");
    }

    #[test]
    fn dtstart_utc_and_all_day() {
        let mut utc = record();
        utc.timezone = "UTC".to_string();
        utc.dtstart_millis = 1_250_812_800_000;
        let event = to_component(&utc, &resolver()).unwrap();
        assert_eq!(values(&event, "DTSTART"), vec!["20090821T000000Z"]);

        utc.all_day = true;
        let event = to_component(&utc, &resolver()).unwrap();
        let dtstart = event.get_property("DTSTART").unwrap();
        assert!(dtstart.is_date_only());
        assert_eq!(dtstart.value, "20090821");
    }

    #[test]
    fn requires_recurrence() {
        let mut single = record();
        single.rrule = None;
        single.rdate = None;
        assert!(matches!(
            to_component(&single, &resolver()),
            Err(FormatError::MissingRequiredProperty(_))
        ));
    }

    #[test]
    fn requires_duration() {
        let mut blank = record();
        blank.duration = " ".to_string();
        assert_eq!(
            to_component(&blank, &resolver()),
            Err(FormatError::MissingRequiredProperty("DURATION".to_string()))
        );
    }

    #[test]
    fn unknown_timezone() {
        let mut other = record();
        other.timezone = "Test/Unknown".to_string();
        assert_eq!(
            to_component(&other, &resolver()),
            Err(FormatError::UnknownTimezone("Test/Unknown".to_string()))
        );
    }
}
