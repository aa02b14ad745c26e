// EONET categories and per-category events.

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use tracing::{debug, info, warn};

use feedline_api::eonet::{self, CategoriesResponse, EventsResponse};
use feedline_api::{HttpClient, ResponseEnvelope};

use super::or_empty;
use crate::cache::{Fetch, ResponseCache, RetentionScope};
use crate::convert::records_from;
use crate::error::CoreError;
use crate::model::{Category, Event, EventStatus};

/// Stream of event batches, one item per category request.
pub type EventBatches = BoxStream<'static, Result<Vec<Event>, CoreError>>;

/// Categories and their events from an EONET endpoint.
///
/// The category listing is cached for the life of the source; event
/// listings are shared only while some caller is waiting on them.
pub struct EventSource<F = HttpClient> {
    catalog: ResponseCache<F>,
    feeds: ResponseCache<F>,
}

impl<F> Clone for EventSource<F> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            feeds: self.feeds.clone(),
        }
    }
}

impl<F: Fetch> EventSource<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            catalog: ResponseCache::new(Arc::clone(&fetcher), RetentionScope::Forever),
            feeds: ResponseCache::new(fetcher, RetentionScope::WhileReferenced),
        }
    }

    /// All categories, sorted by name. Any failure yields an empty list.
    pub async fn categories(&self) -> Vec<Category> {
        let request = eonet::categories_request();
        let identity = request.identity();

        let decoded = self
            .catalog
            .fetch(request)
            .await
            .map_err(CoreError::from_shared)
            .and_then(|envelope| decode::<CategoriesResponse>(&envelope, identity.as_str()));

        match decoded {
            Ok(resp) => {
                let mut categories: Vec<Category> = records_from(resp.categories);
                categories.sort_by(|a, b| a.name.cmp(&b.name));
                info!(count = categories.len(), "categories loaded");
                categories
            }
            Err(e) => {
                // A non-2xx answer is cached like any other; drop it.
                self.catalog.invalidate(&identity);
                warn!(error = %e, "category listing unavailable");
                Vec::new()
            }
        }
    }

    /// One batch of events for `category` with the given status.
    pub async fn events(
        &self,
        category: &Category,
        days: u32,
        status: EventStatus,
    ) -> Result<Vec<Event>, CoreError> {
        let request = eonet::events_request(&category.endpoint, days, &status.to_string())?;
        let identity = request.identity();
        debug!(category = %category.id, %status, "fetching events");

        let result = self
            .feeds
            .fetch(request)
            .await
            .map_err(CoreError::from_shared)
            .and_then(|envelope| decode::<EventsResponse>(&envelope, identity.as_str()))
            .map(|resp| records_from::<_, Event>(resp.events));

        or_empty(result, identity.as_str())
    }

    /// Open and closed events for `category`, fetched concurrently and
    /// reduced into one batch.
    pub async fn category_events(
        &self,
        category: &Category,
        days: u32,
    ) -> Result<Vec<Event>, CoreError> {
        let (mut open, closed) = tokio::try_join!(
            self.events(category, days, EventStatus::Open),
            self.events(category, days, EventStatus::Closed),
        )?;
        open.extend(closed);
        debug!(category = %category.id, count = open.len(), "category events fetched");
        Ok(open)
    }

    /// One lazily started sub-stream per category, for the aggregator.
    pub fn category_streams(&self, categories: &[Category], days: u32) -> Vec<EventBatches> {
        categories
            .iter()
            .map(|category| {
                let source = self.clone();
                let category = category.clone();
                stream::once(async move { source.category_events(&category, days).await }).boxed()
            })
            .collect()
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    envelope: &ResponseEnvelope,
    url: &str,
) -> Result<T, CoreError> {
    Ok(envelope.error_for_status(url)?.json()?)
}
