//! iCalendar serialization (RFC 5545).
//!
//! - Fold: content line folding at 75 octets
//! - Serializer: components and properties back to text

mod fold;
mod serializer;

pub use fold::fold_line;
pub use serializer::{serialize_component, serialize_property};
