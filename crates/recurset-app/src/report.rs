//! JSON rendering of normalization results.

use recurset_rfc::FormatResult;
use recurset_rfc::rfc::ical::NormalizedRecurrence;
use serde_json::{Value, json};

/// ## Summary
/// Renders one JSON array entry per event: the storage record on success,
/// `{"error": "..."}` on failure.
///
/// ## Errors
/// Returns an error if a record cannot be serialized.
pub fn render(results: &[FormatResult<NormalizedRecurrence>], pretty: bool) -> serde_json::Result<String> {
    let entries = results
        .iter()
        .map(|result| match result {
            Ok(record) => serde_json::to_value(record),
            Err(e) => {
                tracing::error!(error = %e, "Event failed to normalize");
                Ok(json!({ "error": e.to_string() }))
            }
        })
        .collect::<serde_json::Result<Vec<Value>>>()?;

    if pretty {
        serde_json::to_string_pretty(&entries)
    } else {
        serde_json::to_string(&entries)
    }
}

/// Number of events that failed.
pub fn failure_count(results: &[FormatResult<NormalizedRecurrence>]) -> usize {
    results.iter().filter(|result| result.is_err()).count()
}
