//! Round-trip tests: text to tree to text, and record to tree to record.

use super::fixtures::*;
use crate::rfc::ical::{
    ChronoTzResolver, normalize, parse, parse_calendar, serialize_component, to_component,
};

#[test]
fn calendar_serializes_to_equal_tree() {
    let first = parse_calendar(CALENDAR_TWO_EVENTS).unwrap();
    let serialized = serialize_component(&first);
    let second = parse_calendar(&serialized).unwrap();

    assert_eq!(first, second);
    for line in serialized.split("\r\n") {
        assert!(line.len() <= 75, "line too long: {line:?}");
    }
}

#[test]
fn bare_block_serializes_to_equal_tree() {
    for block in [NY_DAILY, ALL_DAY_ONE_DAY, TWO_RULES, LA_RDATE, CROSS_ZONE] {
        let first = parse(block).unwrap();
        let second = parse(&serialize_component(&first)).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn quoted_parameter_survives() {
    let first = parse_calendar(CALENDAR_TWO_EVENTS).unwrap();
    let serialized = serialize_component(&first);
    assert!(serialized.contains("ATTENDEE;CN=\"Doe, Jane\";ROLE=REQ-PARTICIPANT:mailto:"));
}

#[test]
fn record_survives_component_rebuild() {
    let resolver = ChronoTzResolver::new();
    for block in [NY_DAILY, ALL_DAY_ONE_DAY, TWO_RULES, LA_RDATE, CROSS_ZONE] {
        let record = normalize(&parse(block).unwrap(), &resolver).unwrap();
        let rebuilt = to_component(&record, &resolver).unwrap();
        let again = normalize(&rebuilt, &resolver).unwrap();
        assert_eq!(record, again, "block {block:?}");
    }
}

#[test]
fn rebuilt_component_serializes() {
    let resolver = ChronoTzResolver::new();
    let record = normalize(&parse(LA_RDATE).unwrap(), &resolver).unwrap();
    let text = serialize_component(&to_component(&record, &resolver).unwrap());
    assert_eq!(
        text,
        "BEGIN:VEVENT\r\n\
         DTSTART;TZID=America/Los_Angeles:20090821T010203\r\n\
         DURATION:P2H\r\n\
         RDATE;VALUE=DATE;TZID=America/Los_Angeles:20110601,20110602,20110603\r\n\
         END:VEVENT\r\n"
    );
}
