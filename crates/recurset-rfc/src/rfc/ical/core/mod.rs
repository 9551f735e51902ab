//! iCalendar core models (RFC 5545).
//!
//! Properties keep their raw value text; interpretation of DATE and
//! DATE-TIME values happens only where a caller asks for it.

mod component;
mod datetime;
mod parameter;
mod property;

pub use component::{Component, ComponentKind, ROOT_NAME};
pub use datetime::DateTimeValue;
pub use parameter::Parameter;
pub use property::{Property, PropertyKind};
