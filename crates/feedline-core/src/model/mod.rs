// ── Domain model ──
//
// Canonical record types produced by `convert` from the wire types and
// consumed by the cache, aggregator, store and presentation layers.

pub mod activity;
pub mod category;
pub mod event;
pub mod id;

use chrono::{DateTime, Utc};

pub use activity::Activity;
pub use category::Category;
pub use event::{Event, EventStatus};
pub use id::{CategoryId, RecordId};

/// A domain record that can live in an [`Aggregate`](crate::Aggregate).
///
/// Identity is the id alone: two records with the same id are the same
/// record, whatever their other fields say.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> &RecordId;

    fn timestamp(&self) -> Option<DateTime<Utc>>;
}
