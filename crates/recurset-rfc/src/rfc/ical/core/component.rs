//! iCalendar component types (RFC 5545 §3.4-3.6).

use super::{Property, PropertyKind};

/// Name given to the synthetic container that [`crate::rfc::ical::parse`]
/// fills with a bare property block.
pub const ROOT_NAME: &str = "ROOT";

/// Component kind for iCalendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Synthetic container for a bare property block.
    Root,
    /// VCALENDAR wrapper component.
    Calendar,
    /// VEVENT component.
    Event,
    /// VTODO component.
    Todo,
    /// VJOURNAL component.
    Journal,
    /// VFREEBUSY component.
    FreeBusy,
    /// VTIMEZONE component.
    Timezone,
    /// VALARM component (nested within VEVENT/VTODO).
    Alarm,
    /// STANDARD sub-component of VTIMEZONE.
    Standard,
    /// DAYLIGHT sub-component of VTIMEZONE.
    Daylight,
    /// Unknown/X-component.
    Unknown,
}

impl ComponentKind {
    /// Returns the string name for this component kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => ROOT_NAME,
            Self::Calendar => "VCALENDAR",
            Self::Event => "VEVENT",
            Self::Todo => "VTODO",
            Self::Journal => "VJOURNAL",
            Self::FreeBusy => "VFREEBUSY",
            Self::Timezone => "VTIMEZONE",
            Self::Alarm => "VALARM",
            Self::Standard => "STANDARD",
            Self::Daylight => "DAYLIGHT",
            Self::Unknown => "X-UNKNOWN",
        }
    }

    /// Parses a component kind from a string (case-insensitive).
    ///
    /// `ROOT` is never produced here; the synthetic root only comes from
    /// [`Component::root`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "VCALENDAR" => Self::Calendar,
            "VEVENT" => Self::Event,
            "VTODO" => Self::Todo,
            "VJOURNAL" => Self::Journal,
            "VFREEBUSY" => Self::FreeBusy,
            "VTIMEZONE" => Self::Timezone,
            "VALARM" => Self::Alarm,
            "STANDARD" => Self::Standard,
            "DAYLIGHT" => Self::Daylight,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An iCalendar component.
///
/// Children are owned by their parent; a child only remembers its parent's
/// name, which is set when it is attached with [`Component::add_child`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Component type.
    pub kind: ComponentKind,
    /// Original component name (preserved for X-components).
    pub name: String,
    /// Name of the enclosing component, if attached to one.
    pub parent: Option<String>,
    /// Properties in order of appearance.
    pub properties: Vec<Property>,
    /// Nested sub-components.
    pub children: Vec<Component>,
}

impl Component {
    /// Creates a new component with the given kind.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            name: kind.as_str().to_string(),
            parent: None,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates a new component with a custom name (for X-components).
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        let name = name.into().to_ascii_uppercase();
        Self {
            kind: ComponentKind::parse(&name),
            name,
            parent: None,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates the synthetic container for a bare property block.
    #[must_use]
    pub fn root() -> Self {
        Self::new(ComponentKind::Root)
    }

    /// Creates a VEVENT component.
    #[must_use]
    pub fn event() -> Self {
        Self::new(ComponentKind::Event)
    }

    /// Adds a property to this component.
    pub fn add_property(&mut self, prop: Property) {
        self.properties.push(prop);
    }

    /// Adds a child component, recording this component as its parent.
    pub fn add_child(&mut self, mut child: Component) {
        child.parent = Some(self.name.clone());
        self.children.push(child);
    }

    /// Returns the first property with the given name.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns all properties with the given name.
    #[must_use]
    pub fn get_properties(&self, name: &str) -> Vec<&Property> {
        self.properties
            .iter()
            .filter(|p| p.name.eq_ignore_ascii_case(name))
            .collect()
    }

    /// Returns the first property of the given kind.
    #[must_use]
    pub fn first_of(&self, kind: PropertyKind) -> Option<&Property> {
        self.properties.iter().find(|p| p.kind == kind)
    }

    /// Iterates over every property of the given kind, in source order.
    pub fn properties_of(&self, kind: PropertyKind) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(move |p| p.kind == kind)
    }

    /// Returns direct children of a specific kind.
    #[must_use]
    pub fn children_of_kind(&self, kind: ComponentKind) -> Vec<&Component> {
        self.children.iter().filter(|c| c.kind == kind).collect()
    }

    /// Returns every descendant of the given kind, depth-first.
    #[must_use]
    pub fn descendants_of_kind(&self, kind: ComponentKind) -> Vec<&Component> {
        let mut found = Vec::new();
        for child in &self.children {
            if child.kind == kind {
                found.push(child);
            }
            found.extend(child.descendants_of_kind(kind));
        }
        found
    }

    /// Returns all VEVENT components anywhere below this one.
    #[must_use]
    pub fn events(&self) -> Vec<&Component> {
        self.descendants_of_kind(ComponentKind::Event)
    }

    /// Returns whether this is the synthetic container.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.kind == ComponentKind::Root
    }
}

impl Default for Component {
    fn default() -> Self {
        Self::root()
    }
}
