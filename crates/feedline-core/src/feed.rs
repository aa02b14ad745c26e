// ── Feed controller ──
//
// Owns the sources, the activity aggregate and the on-disk snapshots, and
// publishes every merge to the FeedStore. All mutation goes through here;
// background refresh runs as a cancellable task.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::future;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use feedline_api::{HttpClient, TransportConfig};

use crate::aggregate::{Aggregate, CategoryAggregator, CategorySnapshots, fold_events};
use crate::cache::Fetch;
use crate::config::FeedConfig;
use crate::error::CoreError;
use crate::model::{Activity, Category, CategoryId};
use crate::persist::{MarkerFile, SnapshotFile};
use crate::source::{ActivitySource, EventSource};
use crate::store::FeedStore;

/// Outcome of one activity refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityRefresh {
    /// Records not seen before this refresh.
    pub added: usize,
    /// Records retained after the merge.
    pub total: usize,
    /// Whether a new `Last-Modified` marker was stored.
    pub marker_changed: bool,
}

/// What a background refresh tick polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshTargets {
    /// Repository activity only.
    #[default]
    Activity,
    /// Activity, then every event category.
    All,
}

// ── Feed ─────────────────────────────────────────────────────────────

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<FeedInner>`.
pub struct Feed<F = HttpClient> {
    inner: Arc<FeedInner<F>>,
}

impl<F> Clone for Feed<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct FeedInner<F> {
    config: FeedConfig,
    store: Arc<FeedStore>,
    events: EventSource<F>,
    activity: ActivitySource<F>,
    aggregator: CategoryAggregator,
    /// Activity aggregate and marker; the lock serialises refreshes.
    state: Mutex<ActivityState>,
    snapshot: SnapshotFile<Vec<Activity>>,
    categories: SnapshotFile<Vec<Category>>,
    marker: MarkerFile,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

struct ActivityState {
    aggregate: Aggregate<Activity>,
    marker: Option<String>,
}

impl Feed<HttpClient> {
    /// Build HTTP clients from `config` and load persisted state.
    ///
    /// The GitHub token, if any, is only sent to the GitHub API.
    pub fn open(config: FeedConfig) -> Result<Self, CoreError> {
        let anonymous = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let authenticated = match config.token.clone() {
            Some(token) => anonymous.clone().with_token(token),
            None => anonymous.clone(),
        };

        let eonet = HttpClient::new(&config.eonet_url, &anonymous)?;
        let github = HttpClient::new(&config.github_url, &authenticated)?;
        Ok(Self::with_fetchers(config, Arc::new(eonet), Arc::new(github)))
    }
}

impl<F: Fetch> Feed<F> {
    /// Build a feed over arbitrary fetchers and load persisted state.
    pub fn with_fetchers(config: FeedConfig, eonet: Arc<F>, github: Arc<F>) -> Self {
        let snapshot = SnapshotFile::new(config.activity_path());
        let categories = SnapshotFile::new(config.categories_path());
        let marker = MarkerFile::new(config.marker_path());

        let aggregate = Aggregate::from_records(snapshot.load(), config.activity_cap);
        let stored_marker = marker.load();
        debug!(
            records = aggregate.len(),
            marker = ?stored_marker,
            "loaded persisted activity"
        );

        let listing: Vec<Category> = categories.load();
        debug!(categories = listing.len(), "loaded persisted categories");

        let store = Arc::new(FeedStore::new(config.activity_cap));
        store.publish_activity(Arc::new(aggregate.clone()));
        store.publish_categories(Arc::new(listing));

        Self {
            inner: Arc::new(FeedInner {
                aggregator: CategoryAggregator::new(config.max_concurrent),
                events: EventSource::new(eonet),
                activity: ActivitySource::new(github),
                state: Mutex::new(ActivityState {
                    aggregate,
                    marker: stored_marker,
                }),
                snapshot,
                categories,
                marker,
                store,
                config,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<FeedStore> {
        &self.inner.store
    }

    // ── Categories ───────────────────────────────────────────────────

    /// Category snapshots as they are folded, each one persisted and then
    /// published to the store. The first item is the bare category list.
    ///
    /// An empty listing never replaces a non-empty persisted one: the
    /// stored snapshot stays authoritative until EONET answers again.
    pub async fn category_updates(&self) -> CategorySnapshots {
        let store = Arc::clone(&self.inner.store);
        let file = self.inner.categories.clone();
        let keep_prior = !store.categories_snapshot().is_empty();

        self.inner
            .aggregator
            .load(&self.inner.events, self.inner.config.days)
            .await
            .filter(move |item| {
                let stale = keep_prior && matches!(item, Ok(snapshot) if snapshot.is_empty());
                if stale {
                    debug!("empty category listing, keeping persisted snapshot");
                }
                future::ready(!stale)
            })
            .map(move |item| -> Result<Arc<Vec<Category>>, CoreError> {
                let snapshot = item?;
                file.save(&snapshot)?;
                store.publish_categories(Arc::clone(&snapshot));
                Ok(snapshot)
            })
            .boxed()
    }

    /// Run the category fold to completion and return the final snapshot.
    pub async fn refresh_categories(&self) -> Result<Arc<Vec<Category>>, CoreError> {
        let mut updates = self.category_updates().await;
        let mut last = self.inner.store.categories_snapshot();
        while let Some(item) = updates.next().await {
            last = item?;
        }
        info!(categories = last.len(), "categories refreshed");
        Ok(last)
    }

    /// One category with its events, fetched on its own.
    pub async fn category(&self, id: &CategoryId) -> Result<Category, CoreError> {
        let category = match self.inner.store.category(id) {
            Some(category) => category,
            None => self
                .inner
                .events
                .categories()
                .await
                .into_iter()
                .find(|c| &c.id == id)
                .ok_or_else(|| CoreError::CategoryNotFound {
                    identifier: id.to_string(),
                })?,
        };

        let batch = self
            .inner
            .events
            .category_events(&category, self.inner.config.days)
            .await?;
        let mut folded = fold_events(std::slice::from_ref(&category), &batch);
        folded.pop().ok_or_else(|| CoreError::Internal("fold dropped a category".into()))
    }

    // ── Activity ─────────────────────────────────────────────────────

    /// Poll the repository, merge anything new, publish and persist.
    ///
    /// The snapshot is written before anything is published or the marker
    /// moves, so neither readers nor the marker run ahead of what is on
    /// disk. A failed write leaves every piece of state as it was.
    pub async fn refresh_activity(&self) -> Result<ActivityRefresh, CoreError> {
        let mut state = self.inner.state.lock().await;
        let fetched = self
            .inner
            .activity
            .fetch(&self.inner.config.repo, state.marker.clone())
            .await?;

        let mut added = 0;
        if !fetched.records.is_empty() {
            let mut next = state.aggregate.clone();
            added = next.merge_newest(fetched.records);
            self.inner.snapshot.save(&next.records().to_vec())?;
            self.inner.store.publish_activity(Arc::new(next.clone()));
            state.aggregate = next;
        }

        let mut marker_changed = false;
        if let Some(marker) = fetched.last_modified {
            if state.marker.as_deref() != Some(marker.as_str()) {
                self.inner.marker.save(&marker)?;
                state.marker = Some(marker);
                marker_changed = true;
            }
        }

        let outcome = ActivityRefresh {
            added,
            total: state.aggregate.len(),
            marker_changed,
        };
        info!(
            added = outcome.added,
            total = outcome.total,
            marker_changed,
            "activity refreshed"
        );
        Ok(outcome)
    }

    // ── Background refresh ───────────────────────────────────────────

    /// Refresh `targets` every `interval` until
    /// [`shutdown`](Self::shutdown).
    pub async fn spawn_refresh(&self, interval: Duration, targets: RefreshTargets) {
        let feed = self.clone();
        let cancel = self.inner.cancel.child_token();
        let handle = tokio::spawn(refresh_task(feed, interval, targets, cancel));
        self.inner.task_handles.lock().await.push(handle);
    }

    /// Stop background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("feed shut down");
    }
}

async fn refresh_task<F: Fetch>(
    feed: Feed<F>,
    interval: Duration,
    targets: RefreshTargets,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(interval);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = feed.refresh_activity().await {
                    warn!(error = %e, "periodic activity refresh failed");
                }
                if targets == RefreshTargets::All {
                    if let Err(e) = feed.refresh_categories().await {
                        warn!(error = %e, "periodic category refresh failed");
                    }
                }
            }
        }
    }
}
