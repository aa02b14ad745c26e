// Watch-channel backed store of immutable snapshots.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::aggregate::Aggregate;
use crate::model::{Activity, Category, CategoryId};
use crate::stream::SnapshotStream;

/// Latest categories and activity, published as `Arc` snapshots.
///
/// Readers never see a half-applied merge: every publish swaps in a
/// complete new snapshot. Only the owning `Feed` publishes.
pub struct FeedStore {
    categories: watch::Sender<Arc<Vec<Category>>>,
    activity: watch::Sender<Arc<Aggregate<Activity>>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl FeedStore {
    pub fn new(activity_cap: usize) -> Self {
        let (categories, _) = watch::channel(Arc::new(Vec::new()));
        let (activity, _) = watch::channel(Arc::new(Aggregate::new(activity_cap)));
        let (last_refresh, _) = watch::channel(None);

        Self {
            categories,
            activity,
            last_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn categories_snapshot(&self) -> Arc<Vec<Category>> {
        self.categories.borrow().clone()
    }

    pub fn activity_snapshot(&self) -> Arc<Aggregate<Activity>> {
        self.activity.borrow().clone()
    }

    pub fn category(&self, id: &CategoryId) -> Option<Category> {
        self.categories
            .borrow()
            .iter()
            .find(|c| &c.id == id)
            .cloned()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_categories(&self) -> SnapshotStream<Vec<Category>> {
        SnapshotStream::new(self.categories.subscribe())
    }

    pub fn subscribe_activity(&self) -> SnapshotStream<Aggregate<Activity>> {
        SnapshotStream::new(self.activity.subscribe())
    }

    // ── Publishing ───────────────────────────────────────────────────

    pub(crate) fn publish_categories(&self, snapshot: Arc<Vec<Category>>) {
        self.categories.send_replace(snapshot);
        self.touch();
    }

    pub(crate) fn publish_activity(&self, snapshot: Arc<Aggregate<Activity>>) {
        self.activity.send_replace(snapshot);
        self.touch();
    }

    fn touch(&self) {
        self.last_refresh.send_replace(Some(Utc::now()));
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new(crate::aggregate::DEFAULT_CAP)
    }
}
