// ── Published feed state ──
//
// Single writer (the `Feed`), any number of snapshot readers.

mod feed_store;

pub use feed_store::FeedStore;
