// ── Remote record sources ──
//
// Turn requests into domain record batches through a `ResponseCache`.
// Transient and malformed failures degrade to an empty batch here, so
// only unrecoverable errors ever reach the aggregation layer.

mod activity;
mod eonet;

pub use activity::{ActivityFetch, ActivitySource};
pub use eonet::EventSource;

use tracing::warn;

use crate::error::CoreError;

/// Substitute an empty batch for recoverable failures.
fn or_empty<T>(result: Result<Vec<T>, CoreError>, what: &str) -> Result<Vec<T>, CoreError> {
    match result {
        Err(e) if e.is_recoverable() => {
            warn!(error = %e, source = what, "no new data this refresh");
            Ok(Vec::new())
        }
        other => other,
    }
}
