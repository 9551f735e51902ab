use thiserror::Error;

use crate::rfc::ical::parse::{ParseError, ParseErrorKind};

/// Failures raised while parsing or normalizing an event block.
///
/// None of these are retried internally; the caller decides whether to skip
/// the component or surface the error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Malformed line: {0}")]
    MalformedLine(#[from] ParseError),

    #[error("Missing required property: {0}")]
    MissingRequiredProperty(String),

    #[error("Unparseable {property} value {value:?}: {reason}")]
    UnparseableDateTime {
        property: String,
        value: String,
        reason: ParseErrorKind,
    },

    #[error("Unknown timezone: {0:?}")]
    UnknownTimezone(String),
}

pub type FormatResult<T> = std::result::Result<T, FormatError>;
