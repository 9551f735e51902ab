//! iCalendar property types (RFC 5545 §3.1, §3.8).

use super::Parameter;

/// The property names the recurrence normalizer acts on.
///
/// Everything else parses into [`PropertyKind::Other`] and is carried along
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    DtStart,
    DtEnd,
    Duration,
    RRule,
    RDate,
    ExRule,
    ExDate,
    /// Unrecognized; ignored by normalization.
    Other,
}

impl PropertyKind {
    /// Returns the property name for this kind, or `None` for [`Self::Other`].
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::DtStart => Some("DTSTART"),
            Self::DtEnd => Some("DTEND"),
            Self::Duration => Some("DURATION"),
            Self::RRule => Some("RRULE"),
            Self::RDate => Some("RDATE"),
            Self::ExRule => Some("EXRULE"),
            Self::ExDate => Some("EXDATE"),
            Self::Other => None,
        }
    }

    /// Classifies a property name (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "DTSTART" => Self::DtStart,
            "DTEND" => Self::DtEnd,
            "DURATION" => Self::Duration,
            "RRULE" => Self::RRule,
            "RDATE" => Self::RDate,
            "EXRULE" => Self::ExRule,
            "EXDATE" => Self::ExDate,
            _ => Self::Other,
        }
    }
}

/// A single content line: name, parameters and raw value.
///
/// The value is kept exactly as it appeared after unfolding; no value-type
/// interpretation happens at this level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Classified name.
    pub kind: PropertyKind,
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance; names are unique.
    pub params: Vec<Parameter>,
    /// Raw value string.
    pub value: String,
}

impl Property {
    /// Creates a property without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_params(name, Vec::new(), value)
    }

    /// Creates a property with parameters.
    #[must_use]
    pub fn with_params(
        name: impl Into<String>,
        params: Vec<Parameter>,
        value: impl Into<String>,
    ) -> Self {
        let name = name.into().to_ascii_uppercase();
        Self {
            kind: PropertyKind::parse(&name),
            name,
            params,
            value: value.into(),
        }
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Parameter> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.get_param(name)?.value()
    }

    /// Returns the TZID parameter if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.get_param_value("TZID")
    }

    /// Returns whether the property carries `VALUE=DATE`.
    #[must_use]
    pub fn is_date_only(&self) -> bool {
        self.get_param("VALUE").is_some_and(|p| p.has_value("DATE"))
    }
}
