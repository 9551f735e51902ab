//! iCalendar serializer (RFC 5545).
//!
//! Writes components and properties back to folded, CRLF-terminated content
//! lines. Properties keep their source order and values are written as they
//! were read.

use super::fold::fold_line;
use crate::rfc::ical::core::{Component, Property};

/// Serializes a component to a string.
///
/// The synthetic root produced by [`crate::rfc::ical::parse`] has no
/// `BEGIN`/`END` framing; only its contents are written.
#[must_use]
pub fn serialize_component(component: &Component) -> String {
    let mut result = String::new();
    write_component(&mut result, component);
    result
}

fn write_component(out: &mut String, component: &Component) {
    let framed = !component.is_root();

    if framed {
        out.push_str(&fold_line(&format!("BEGIN:{}", component.name)));
    }
    for prop in &component.properties {
        out.push_str(&serialize_property(prop));
    }
    for child in &component.children {
        write_component(out, child);
    }
    if framed {
        out.push_str(&fold_line(&format!("END:{}", component.name)));
    }
}

/// Serializes a property to a folded content line.
#[must_use]
pub fn serialize_property(prop: &Property) -> String {
    let mut line = prop.name.clone();

    for param in &prop.params {
        line.push(';');
        line.push_str(&param.to_string());
    }

    line.push(':');
    line.push_str(&prop.value);

    fold_line(&line)
}
