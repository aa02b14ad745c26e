// feedline-core: Caching, merging and persistence pipeline between feedline-api and the CLI.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod feed;
pub mod model;
pub mod persist;
pub mod present;
pub mod source;
pub mod store;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{Aggregate, CategoryAggregator, fold_events, merge_bounded};
pub use cache::{Fetch, ResponseCache, RetentionScope, SharedResponse};
pub use config::FeedConfig;
pub use error::CoreError;
pub use feed::{ActivityRefresh, Feed, RefreshTargets};
pub use persist::{MarkerFile, SnapshotFile};
pub use source::{ActivityFetch, ActivitySource, EventSource};
pub use store::FeedStore;
pub use stream::{EventFilter, SnapshotStream};

// Re-export model types at the crate root for ergonomics.
pub use model::{Activity, Category, CategoryId, Event, EventStatus, Record, RecordId};
