// HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, query encoding and the
// conditional `If-Modified-Since` header. Status codes are not turned into
// errors here; the envelope carries them and callers filter.

use reqwest::header::IF_MODIFIED_SINCE;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::request::{Request, ResponseEnvelope};
use crate::transport::TransportConfig;

/// GET-only client bound to one base URL.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self { http, base_url })
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve the full URL for a request: `{base}/{endpoint}?{query}`.
    ///
    /// Absolute endpoints (`https://...`) are used as-is, only the query
    /// is appended.
    pub fn url_for(&self, request: &Request) -> Result<Url, Error> {
        let endpoint = request.endpoint();
        let mut url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Url::parse(endpoint)?
        } else {
            let full = format!(
                "{}/{}",
                self.base_url.as_str().trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            );
            Url::parse(&full)?
        };

        if !request.query().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query());
        }

        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and drain the response into an envelope.
    pub async fn get(&self, request: &Request) -> Result<ResponseEnvelope, Error> {
        let url = self.url_for(request)?;
        debug!("GET {}", url);

        let mut builder = self.http.get(url);
        if let Some(marker) = request.if_modified_since() {
            builder = builder.header(IF_MODIFIED_SINCE, marker);
        }

        let resp = builder.send().await.map_err(Error::Transport)?;
        let envelope = ResponseEnvelope::read(resp).await?;
        debug!(status = envelope.status, bytes = envelope.body.len(), "response received");
        Ok(envelope)
    }
}
