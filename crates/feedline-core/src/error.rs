// ── Core error types ──
//
// User-facing errors from feedline-core. Transport-level failures arrive
// as `feedline_api::Error`, usually shared between several waiters, and
// are classified here into recoverable fetch errors (degrade to an empty
// batch) and unrecoverable ones (abort the aggregation).

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Fetch errors ─────────────────────────────────────────────────
    /// Network, HTTP status or payload failure. Possibly shared by every
    /// subscriber of the same in-flight request.
    #[error("Fetch failed: {source}")]
    Fetch {
        #[source]
        source: Arc<feedline_api::Error>,
    },

    /// The request could not even be built; retrying it cannot help.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // ── Pipeline errors ──────────────────────────────────────────────
    /// A merged sub-stream failed; remaining work was cancelled.
    #[error("Aggregation aborted after {completed} batch(es): {source}")]
    Aggregation {
        completed: usize,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Category not found: {identifier}")]
    CategoryNotFound { identifier: String },

    // ── Persistence errors ───────────────────────────────────────────
    #[error("Failed to write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap an error that may be shared with other waiters.
    pub fn from_shared(err: Arc<feedline_api::Error>) -> Self {
        if err.is_request_error() {
            Self::InvalidRequest {
                message: err.to_string(),
            }
        } else {
            Self::Fetch { source: err }
        }
    }

    /// Transient network failures and undecodable payloads.
    ///
    /// Sources substitute an empty result for these.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch { source } => source.is_transient() || source.is_malformed(),
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<feedline_api::Error> for CoreError {
    fn from(err: feedline_api::Error) -> Self {
        Self::from_shared(Arc::new(err))
    }
}
