// Request and response value types.
//
// A `Request` is immutable once built; its `RequestIdentity` decides which
// requests may share a single in-flight fetch. A `ResponseEnvelope` is the
// raw HTTP result, produced once and shared by every subscriber.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use reqwest::header::LAST_MODIFIED;
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use crate::error::Error;

// ── Request ─────────────────────────────────────────────────────────

/// A GET request against one endpoint.
///
/// `endpoint` is either a path relative to the client's base URL
/// (`/categories`) or an absolute URL (EONET hands out category links
/// that way).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    endpoint: String,
    query: BTreeMap<String, String>,
    if_modified_since: Option<String>,
}

impl Request {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: BTreeMap::new(),
            if_modified_since: None,
        }
    }

    /// Add (or replace) a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    /// Ask the server for changes since the given marker only.
    pub fn with_if_modified_since(mut self, marker: Option<String>) -> Self {
        self.if_modified_since = marker.filter(|m| !m.trim().is_empty());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn if_modified_since(&self) -> Option<&str> {
        self.if_modified_since.as_deref()
    }

    /// The cache-sharing key: endpoint plus parameters.
    ///
    /// Keys and values are form-encoded so that distinct parameter sets
    /// never render to the same key. The conditional marker is not part of
    /// the identity.
    pub fn identity(&self) -> RequestIdentity {
        let mut key = self.endpoint.clone();
        if !self.query.is_empty() {
            let params = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            key.push('?');
            key.push_str(&params);
        }
        RequestIdentity(key)
    }
}

/// Canonical identity of a [`Request`], used as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestIdentity(String);

impl RequestIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── ResponseEnvelope ────────────────────────────────────────────────

/// Raw HTTP response: status, body bytes and the headers we care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub body: Bytes,
    pub last_modified: Option<String>,
    /// Lowercased header names; values that are not valid UTF-8 are dropped.
    pub headers: BTreeMap<String, String>,
}

impl ResponseEnvelope {
    /// Build an envelope directly (tests, in-memory fetchers).
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            last_modified: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_last_modified(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        self.headers
            .insert(LAST_MODIFIED.as_str().to_owned(), marker.clone());
        self.last_modified = Some(marker);
        self
    }

    /// Drain a `reqwest::Response` into an envelope.
    pub async fn read(resp: reqwest::Response) -> Result<Self, Error> {
        let status = resp.status().as_u16();
        let headers: BTreeMap<String, String> = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        let last_modified = headers.get(LAST_MODIFIED.as_str()).cloned();
        let body = resp.bytes().await.map_err(Error::Transport)?;

        Ok(Self {
            status,
            body,
            last_modified,
            headers,
        })
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 2xx or 3xx: a `Last-Modified` header on these is worth keeping.
    pub fn carries_marker(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// Fail with [`Error::Status`] unless the status is 2xx.
    pub fn error_for_status(&self, url: &str) -> Result<&Self, Error> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Status {
                status: self.status,
                url: url.to_owned(),
            })
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::from_utf8_lossy(&self.body).into_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_parameter_order_and_marker() {
        let a = Request::new("/events")
            .with_query("status", "open")
            .with_query("days", 30)
            .with_if_modified_since(Some("Tue, 01 Aug 2017 10:00:00 GMT".into()));
        let b = Request::new("/events")
            .with_query("days", 30)
            .with_query("status", "open");

        assert_eq!(a.identity(), b.identity());
        assert_eq!(a.identity().as_str(), "/events?days=30&status=open");
    }

    #[test]
    fn identity_differs_by_parameter_value() {
        let open = Request::new("/events").with_query("status", "open");
        let closed = Request::new("/events").with_query("status", "closed");
        assert_ne!(open.identity(), closed.identity());
    }

    #[test]
    fn identity_escapes_reserved_characters() {
        let packed = Request::new("/x").with_query("a", "1&b=2");
        let split = Request::new("/x").with_query("a", "1").with_query("b", "2");

        assert_ne!(packed.identity(), split.identity());
        assert_eq!(packed.identity().as_str(), "/x?a=1%26b%3D2");
        assert_eq!(split.identity().as_str(), "/x?a=1&b=2");
    }

    #[test]
    fn identity_without_parameters_is_the_endpoint() {
        assert_eq!(Request::new("/categories").identity().as_str(), "/categories");
    }

    #[test]
    fn blank_marker_is_dropped() {
        let req = Request::new("/x").with_if_modified_since(Some("  ".into()));
        assert!(req.if_modified_since().is_none());
    }

    #[test]
    fn status_ranges() {
        assert!(ResponseEnvelope::new(204, "").is_success());
        assert!(!ResponseEnvelope::new(304, "").is_success());
        assert!(ResponseEnvelope::new(304, "").carries_marker());
        assert!(!ResponseEnvelope::new(500, "").carries_marker());
    }

    #[test]
    fn json_error_keeps_body() {
        let env = ResponseEnvelope::new(200, "not json");
        let err = env.json::<serde_json::Value>().unwrap_err();
        match err {
            Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_for_status_rejects_server_errors() {
        let env = ResponseEnvelope::new(502, "");
        let err = env.error_for_status("https://example.test").unwrap_err();
        assert!(matches!(err, Error::Status { status: 502, .. }));
    }
}
