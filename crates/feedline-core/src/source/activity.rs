// GitHub repository activity, fetched conditionally on a marker.

use std::sync::Arc;

use tracing::{debug, warn};

use feedline_api::github::{self, ActivityEntry};
use feedline_api::{HttpClient, ResponseEnvelope};

use super::or_empty;
use crate::cache::{Fetch, ResponseCache, RetentionScope, SharedResult};
use crate::convert::records_from;
use crate::error::CoreError;
use crate::model::Activity;

/// Result of one activity poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFetch {
    /// New records, newest first. Empty when nothing changed.
    pub records: Vec<Activity>,
    /// `Last-Modified` of the response, if it carried one.
    pub last_modified: Option<String>,
}

pub struct ActivitySource<F = HttpClient> {
    cache: ResponseCache<F>,
}

impl<F> Clone for ActivitySource<F> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<F: Fetch> ActivitySource<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            cache: ResponseCache::new(fetcher, RetentionScope::WhileReferenced),
        }
    }

    /// Poll `repo` for events newer than `marker`.
    ///
    /// Records and marker are read by two subscribers of the same cached
    /// response, so the repository is hit once per poll.
    pub async fn fetch(&self, repo: &str, marker: Option<String>) -> Result<ActivityFetch, CoreError> {
        let request = github::repo_events_request(repo, marker)?;
        let identity = request.identity();

        let for_records = self.cache.fetch(request.clone());
        let for_marker = self.cache.fetch(request);
        let (records, marker) = tokio::join!(for_records, for_marker);

        let records = or_empty(records_from_response(records, identity.as_str()), repo)?;
        let last_modified = marker_from_response(&marker);
        debug!(repo, count = records.len(), marker = ?last_modified, "activity fetched");

        Ok(ActivityFetch {
            records,
            last_modified,
        })
    }
}

/// Records come only from 2xx responses with a non-empty array.
fn records_from_response(result: SharedResult, url: &str) -> Result<Vec<Activity>, CoreError> {
    let envelope = result.map_err(CoreError::from_shared)?;
    if !envelope.is_success() {
        if envelope.status != 304 {
            warn!(status = envelope.status, url, "activity request not successful");
        }
        return Ok(Vec::new());
    }

    let entries: Vec<ActivityEntry> = envelope.json()?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }
    Ok(records_from(entries))
}

/// The marker comes from any 2xx or 3xx response carrying one.
fn marker_from_response(result: &SharedResult) -> Option<String> {
    result
        .as_ref()
        .ok()
        .filter(|envelope| envelope.carries_marker())
        .and_then(|envelope: &Arc<ResponseEnvelope>| envelope.last_modified.clone())
}
