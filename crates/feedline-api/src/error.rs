use thiserror::Error;

/// Top-level error type for the `feedline-api` crate.
///
/// Covers transport failures, request construction problems and payload
/// decoding. `feedline-core` decides which of these are recoverable.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a status the caller cannot use.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    // ── Request construction ────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A query parameter or path segment was rejected before sending.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A header value (token, marker) could not be encoded.
    #[error("Invalid header value for {name}")]
    InvalidHeader { name: &'static str },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` for network and HTTP status failures.
    ///
    /// These are the "no new data this refresh" class: the next refresh
    /// may well succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    /// Returns `true` if the payload arrived but could not be decoded.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Deserialization { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Status { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the request itself was malformed and retrying
    /// it unchanged can never succeed.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl(_) | Self::InvalidParameter { .. } | Self::InvalidHeader { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_as_transient() {
        let err = Error::Status {
            status: 503,
            url: "https://example.test/events".into(),
        };
        assert!(err.is_transient());
        assert!(!err.is_malformed());
        assert!(!err.is_request_error());
    }

    #[test]
    fn classifies_deserialization_as_malformed() {
        let err = Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        };
        assert!(err.is_malformed());
        assert!(!err.is_transient());
    }

    #[test]
    fn not_found_from_status() {
        let err = Error::Status {
            status: 404,
            url: String::new(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn invalid_parameter_is_request_error() {
        let err = Error::InvalidParameter {
            name: "repo".into(),
            reason: "expected owner/name".into(),
        };
        assert!(err.is_request_error());
        assert!(!err.is_transient());
    }
}
