//! Component tree builder.
//!
//! Turns logical content lines into [`Component`]s. `BEGIN:<NAME>` opens a
//! nested component and `END:<NAME>` closes it; everything else becomes a
//! property of the innermost open component.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use crate::rfc::ical::core::Component;

/// Parses a bare property block into a fresh synthetic root component.
///
/// ## Errors
///
/// Returns an error for any malformed content line or unbalanced
/// `BEGIN`/`END` pair.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<Component> {
    let mut root = Component::root();
    parse_into(&mut root, input)?;
    Ok(root)
}

/// Parses content lines, appending properties and nested components to
/// `target` in source order.
///
/// On error `target` may hold the lines that preceded the failure; callers
/// that need all-or-nothing should go through [`parse`].
///
/// ## Errors
///
/// Returns an error for any malformed content line or unbalanced
/// `BEGIN`/`END` pair.
pub fn parse_into(target: &mut Component, input: &str) -> ParseResult<()> {
    let lines = split_lines(input);
    tracing::trace!(count = lines.len(), "Split lines");

    let mut open: Vec<(usize, Component)> = Vec::new();

    for (line_num, line) in lines {
        let property = parse_content_line(&line, line_num)?;

        match property.name.as_str() {
            "BEGIN" => {
                open.push((line_num, Component::custom(property.value.trim())));
            }
            "END" => {
                let end_name = property.value.trim().to_ascii_uppercase();
                let Some((_, component)) = open.pop() else {
                    tracing::warn!(line = line_num, "END without BEGIN");
                    return Err(
                        ParseError::new(ParseErrorKind::MissingBegin, line_num, 1)
                            .with_context(format!("END:{end_name} has no matching BEGIN"))
                            .with_text(line),
                    );
                };
                if component.name != end_name {
                    tracing::warn!(line = line_num, "Mismatched END");
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!(
                                "expected END:{}, got END:{end_name}",
                                component.name
                            ))
                            .with_text(line),
                    );
                }
                match open.last_mut() {
                    Some((_, parent)) => parent.add_child(component),
                    None => target.add_child(component),
                }
            }
            _ => match open.last_mut() {
                Some((_, component)) => component.add_property(property),
                None => target.add_property(property),
            },
        }
    }

    if let Some((begin_line, component)) = open.pop() {
        tracing::warn!(line = begin_line, name = %component.name, "Unterminated component");
        return Err(
            ParseError::new(ParseErrorKind::MissingEnd, begin_line, 1)
                .with_context(format!("missing END:{}", component.name)),
        );
    }

    Ok(())
}

/// Parses a complete `BEGIN`…`END` framed document and returns its single
/// top-level component (typically `VCALENDAR`).
///
/// ## Errors
///
/// Returns `MissingBegin` when the input holds no component, has properties
/// outside it, or holds more than one top-level component, plus any error
/// from [`parse_into`].
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_calendar(input: &str) -> ParseResult<Component> {
    let mut root = Component::root();
    parse_into(&mut root, input)?;

    if let Some(stray) = root.properties.first() {
        tracing::warn!(name = %stray.name, "Property outside of any component");
        return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1)
            .with_context(format!("{} appears outside of any component", stray.name)));
    }

    let mut children = root.children.into_iter();
    match (children.next(), children.next()) {
        (Some(mut top), None) => {
            top.parent = None;
            tracing::debug!(name = %top.name, "Calendar document parsed");
            Ok(top)
        }
        (None, _) => Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1)
            .with_context("no component found")),
        (Some(_), Some(extra)) => Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1)
            .with_context(format!("unexpected second top-level component {}", extra.name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::core::{ComponentKind, PropertyKind};

    const SIMPLE_VEVENT: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:test-uid-123@example.com\r\n\
DTSTART:20260123T140000Z\r\n\
DTEND:20260123T150000Z\r\n\
SUMMARY:Test Event\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
TRIGGER:-PT15M\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn parse_bare_block() {
        let root = parse(
            "DTSTART;VALUE=DATE:20090821\nRRULE:FREQ=YEARLY;WKST=SU\nRRULE:FREQ=MONTHLY;COUNT=3\nDURATION:P2H",
        )
        .unwrap();

        assert!(root.is_root());
        assert_eq!(root.properties.len(), 4);
        assert!(root.children.is_empty());
        let kinds: Vec<PropertyKind> = root.properties.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PropertyKind::DtStart,
                PropertyKind::RRule,
                PropertyKind::RRule,
                PropertyKind::Duration
            ]
        );
    }

    #[test]
    fn parse_into_appends_to_existing() {
        let mut event = Component::event();
        parse_into(&mut event, "DTSTART:20090821T000000Z").unwrap();
        parse_into(&mut event, "DURATION:PT1H").unwrap();
        assert_eq!(event.properties.len(), 2);
        assert_eq!(event.properties[1].value, "PT1H");
    }

    #[test]
    fn parse_nested_components() {
        let calendar = parse_calendar(SIMPLE_VEVENT).unwrap();
        assert_eq!(calendar.kind, ComponentKind::Calendar);
        assert!(calendar.parent.is_none());

        let events = calendar.events();
        assert_eq!(events.len(), 1);
        let event = events[0];
        assert_eq!(event.parent.as_deref(), Some("VCALENDAR"));
        assert_eq!(
            event.get_property("SUMMARY").map(|p| p.value.as_str()),
            Some("Test Event")
        );

        let alarms = event.children_of_kind(ComponentKind::Alarm);
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].parent.as_deref(), Some("VEVENT"));
    }

    #[test]
    fn parse_nests_under_root() {
        let root = parse("BEGIN:VEVENT\nDTSTART:20090821T000000Z\nEND:VEVENT").unwrap();
        assert!(root.properties.is_empty());
        assert_eq!(root.children[0].parent.as_deref(), Some("ROOT"));
    }

    #[test]
    fn parse_malformed_line_reports_position() {
        let err = parse("DTSTART:20090821T000000Z\nDURATION\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingColon);
        assert_eq!(err.line, 2);
        assert_eq!(err.text.as_deref(), Some("DURATION"));
    }

    #[test]
    fn parse_rejects_leading_continuation() {
        let err = parse(" DTSTART:20090821T000000Z\nDURATION:PT1H").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidPropertyName);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn parse_missing_end() {
        let err = parse("BEGIN:VEVENT\nDTSTART:20090821T000000Z\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingEnd);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn parse_mismatched_end() {
        let err = parse_calendar("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VEVENT\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedComponent);
    }

    #[test]
    fn parse_end_without_begin() {
        let err = parse("END:VEVENT").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingBegin);
    }

    #[test]
    fn parse_calendar_rejects_bare_properties() {
        let err = parse_calendar("VERSION:2.0\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingBegin);

        let err = parse_calendar("").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingBegin);
    }

    #[test]
    fn parse_preserves_x_properties() {
        let root = parse("X-CUSTOM-PROP;X-PARAM=1:Custom Value\nDTSTART:20090821T000000Z").unwrap();
        let custom = root.get_property("X-CUSTOM-PROP").unwrap();
        assert_eq!(custom.kind, PropertyKind::Other);
        assert_eq!(custom.value, "Custom Value");
    }
}
