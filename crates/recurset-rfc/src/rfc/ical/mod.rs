//! iCalendar RFC 5545 event handling.
//!
//! - `core`: component, property and parameter types
//! - `parse`: content-line lexer and tree builder
//! - `build`: serialization back to folded content lines
//! - `timezone`: TZID to UTC offset lookup
//! - `recurrence`: normalization of an event into a storage record
//!
//! ## Example
//!
//! ```rust
//! use recurset_rfc::rfc::ical::{ChronoTzResolver, normalize, parse};
//!
//! let block = "DTSTART;TZID=America/New_York:20080221T070000\n\
//!              DTEND;TZID=America/New_York:20080221T190000\n\
//!              RRULE:FREQ=DAILY;UNTIL=20080222T000000Z";
//! let component = parse(block).unwrap();
//! let record = normalize(&component, &ChronoTzResolver::new()).unwrap();
//! assert_eq!(record.duration, "P43200S");
//! ```

pub mod build;
pub mod core;
pub mod parse;
pub mod recurrence;
pub mod timezone;

#[cfg(test)]
mod tests;

pub use self::build::{serialize_component, serialize_property};
pub use self::core::{Component, ComponentKind, Parameter, Property, PropertyKind};
pub use self::parse::{ParseError, ParseResult, parse, parse_calendar};
pub use self::recurrence::{NormalizedRecurrence, normalize, normalize_all, to_component};
pub use self::timezone::{ChronoTzResolver, ConversionError, FixedOffsetResolver, TimezoneResolver};
