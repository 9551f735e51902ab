//! iCalendar event parsing and recurrence normalization.
//!
//! - [`rfc::ical::parse`]: content-line grammar and component trees
//! - [`rfc::ical::recurrence`]: DTSTART/DURATION/rule folding into a storage record
//! - [`rfc::ical::timezone`]: the injected timezone lookup
//! - [`rfc::ical::build`]: serialization back to content lines

pub mod error;
pub mod rfc;

pub use error::{FormatError, FormatResult};
