// ── Merge and fold ──
//
// `merge` fans sub-streams in with bounded concurrency and folds event
// batches into category snapshots. `capped` holds the newest-first,
// size-capped record collection used for repository activity.

mod capped;
mod merge;

pub use capped::{Aggregate, DEFAULT_CAP};
pub use merge::{
    CategoryAggregator, CategorySnapshots, DEFAULT_MAX_CONCURRENT, fold_events, merge_bounded,
};
