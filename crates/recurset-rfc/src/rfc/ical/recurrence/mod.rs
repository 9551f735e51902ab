//! Recurrence normalization.
//!
//! Reduces an event component's DTSTART, DTEND/DURATION and recurrence
//! properties to a flat [`NormalizedRecurrence`], and rebuilds a component
//! from such a record.

mod normalize;
mod populate;
mod record;

pub use normalize::{normalize, normalize_all};
pub use populate::to_component;
pub use record::NormalizedRecurrence;
