// Bounded, completion-ordered merge and the category fold.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use tracing::{debug, warn};

use crate::cache::Fetch;
use crate::error::CoreError;
use crate::model::{Category, Event, RecordId};
use crate::source::EventSource;

/// Sub-streams polled at once unless configured otherwise.
pub const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Category snapshots: the initial list, then one per merged batch.
pub type CategorySnapshots = BoxStream<'static, Result<Arc<Vec<Category>>, CoreError>>;

/// Merge `streams` in completion order, polling at most `max_concurrent`
/// of them at a time. Sub-streams beyond the window are not started until
/// a running one completes.
///
/// Fail-fast: the first `Err` is yielded, then the output ends and every
/// remaining sub-stream is dropped.
pub fn merge_bounded<T, E>(
    streams: Vec<BoxStream<'static, Result<T, E>>>,
    max_concurrent: usize,
) -> BoxStream<'static, Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let mut merged = stream::iter(streams).flatten_unordered(max_concurrent.max(1));

    async_stream::stream! {
        while let Some(item) = merged.next().await {
            let failed = item.is_err();
            yield item;
            if failed {
                break;
            }
        }
    }
    .boxed()
}

/// Add every batch event that belongs to a category and is not already in
/// it, keeping the category's events newest first. Categories the batch
/// does not touch pass through unchanged.
pub fn fold_events(categories: &[Category], batch: &[Event]) -> Vec<Category> {
    categories
        .iter()
        .map(|category| {
            let mut seen: HashSet<&RecordId> = category.events.iter().map(|e| &e.id).collect();
            let fresh: Vec<Event> = batch
                .iter()
                .filter(|e| e.is_in(&category.id) && seen.insert(&e.id))
                .cloned()
                .collect();

            if fresh.is_empty() {
                return category.clone();
            }

            let mut updated = category.clone();
            updated.events.extend(fresh);
            updated.events.sort_by(Event::compare_dates);
            updated
        })
        .collect()
}

/// Drives per-category event requests and folds their batches into
/// successive category snapshots.
#[derive(Debug, Clone, Copy)]
pub struct CategoryAggregator {
    max_concurrent: usize,
}

impl Default for CategoryAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT)
    }
}

impl CategoryAggregator {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Emit `initial`, then a new snapshot for every batch that arrives.
    ///
    /// An unrecoverable batch error ends the stream with
    /// [`CoreError::Aggregation`]; outstanding requests are cancelled.
    pub fn run(
        &self,
        initial: Vec<Category>,
        batches: Vec<BoxStream<'static, Result<Vec<Event>, CoreError>>>,
    ) -> CategorySnapshots {
        let total = batches.len();
        let mut merged = merge_bounded(batches, self.max_concurrent);

        async_stream::stream! {
            let mut current = Arc::new(initial);
            yield Ok(Arc::clone(&current));

            let mut completed = 0usize;
            while let Some(batch) = merged.next().await {
                match batch {
                    Ok(events) => {
                        completed += 1;
                        current = Arc::new(fold_events(&current, &events));
                        debug!(completed, total, events = events.len(), "batch folded");
                        yield Ok(Arc::clone(&current));
                    }
                    Err(e) => {
                        warn!(completed, total, error = %e, "aggregation aborted");
                        yield Err(CoreError::Aggregation {
                            completed,
                            source: Box::new(e),
                        });
                        break;
                    }
                }
            }
        }
        .boxed()
    }

    /// Fetch the category list from `source` and run the fold over every
    /// category's events for the last `days` days.
    pub async fn load<F: Fetch>(&self, source: &EventSource<F>, days: u32) -> CategorySnapshots {
        let categories = source.categories().await;
        let batches = source.category_streams(&categories, days);
        self.run(categories, batches)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use crate::model::CategoryId;

    fn event(id: &str, cats: &[&str], day: u32) -> Event {
        Event {
            id: RecordId::new(id),
            title: id.into(),
            description: String::new(),
            link: None,
            categories: cats.iter().map(|c| CategoryId::new(*c)).collect::<BTreeSet<_>>(),
            date: Some(Utc.with_ymd_and_hms(2017, 8, day, 0, 0, 0).unwrap()),
            closed: None,
        }
    }

    fn category(id: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: id.into(),
            description: String::new(),
            endpoint: format!("/categories/{id}"),
            events: Vec::new(),
        }
    }

    fn ids(category: &Category) -> Vec<&str> {
        category.events.iter().map(|e| e.id.as_str()).collect()
    }

    fn ready_batch(events: Vec<Event>) -> BoxStream<'static, Result<Vec<Event>, CoreError>> {
        stream::once(async move { Ok(events) }).boxed()
    }

    #[test]
    fn fold_appends_matching_events_newest_first() {
        let cats = vec![category("8"), category("10")];
        let folded = fold_events(
            &cats,
            &[event("a", &["8"], 1), event("b", &["8"], 5), event("c", &["12"], 3)],
        );
        assert_eq!(ids(&folded[0]), ["b", "a"]);
        assert_eq!(folded[1], cats[1]);
    }

    #[test]
    fn later_batches_keep_category_newest_first() {
        let first = fold_events(&[category("8")], &[event("old", &["8"], 1), event("mid", &["8"], 4)]);
        let second = fold_events(&first, &[event("new", &["8"], 9), event("early", &["8"], 2)]);
        assert_eq!(ids(&second[0]), ["new", "mid", "early", "old"]);
    }

    #[test]
    fn overlapping_batches_merge_to_unique_set() {
        let cats = vec![category("8")];
        let first = fold_events(&cats, &[event("1", &["8"], 1), event("2", &["8"], 2)]);
        let second = fold_events(&first, &[event("2", &["8"], 2), event("3", &["8"], 3)]);

        let mut merged = ids(&second[0]);
        merged.sort_unstable();
        assert_eq!(merged, ["1", "2", "3"]);
    }

    #[test]
    fn fold_is_idempotent_under_redelivery() {
        let batch = [event("1", &["8"], 1), event("1", &["8"], 1), event("2", &["8"], 2)];
        let once = fold_events(&[category("8")], &batch);
        let twice = fold_events(&once, &batch);
        assert_eq!(once, twice);
        assert_eq!(twice[0].event_count(), 2);
    }

    #[test]
    fn event_in_two_categories_lands_in_both() {
        let folded = fold_events(&[category("8"), category("10")], &[event("x", &["8", "10"], 1)]);
        assert_eq!(ids(&folded[0]), ["x"]);
        assert_eq!(ids(&folded[1]), ["x"]);
    }

    #[tokio::test]
    async fn run_emits_initial_snapshot_then_one_per_batch() {
        let aggregator = CategoryAggregator::default();
        let snapshots: Vec<_> = aggregator
            .run(
                vec![category("8")],
                vec![
                    ready_batch(vec![event("1", &["8"], 1), event("2", &["8"], 2)]),
                    ready_batch(vec![event("2", &["8"], 2), event("3", &["8"], 3)]),
                ],
            )
            .collect()
            .await;

        assert_eq!(snapshots.len(), 3);
        assert!(snapshots[0].as_ref().unwrap()[0].events.is_empty());
        let last = snapshots[2].as_ref().unwrap();
        assert_eq!(last[0].event_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn merge_respects_concurrency_cap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let streams: Vec<BoxStream<'static, Result<u64, ()>>> = (0..6u64)
            .map(|i| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                stream::once(async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10 * (i + 1))).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(i)
                })
                .boxed()
            })
            .collect();

        let results: Vec<_> = merge_bounded(streams, 2).collect().await;
        assert_eq!(results.len(), 6);
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn merge_yields_in_completion_order() {
        let delayed = |id: &'static str, ms: u64| -> BoxStream<'static, Result<&'static str, ()>> {
            stream::once(async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(id)
            })
            .boxed()
        };

        let order: Vec<_> = merge_bounded(vec![delayed("slow", 30), delayed("fast", 10)], 2)
            .map(Result::unwrap)
            .collect()
            .await;
        assert_eq!(order, ["fast", "slow"]);
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_error_ends_merge_and_cancels_the_rest() {
        let slow_dropped = Arc::new(AtomicBool::new(false));
        let queued_started = Arc::new(AtomicBool::new(false));

        let failing = stream::once(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err::<u32, &str>("boom")
        })
        .boxed();
        let slow = {
            let flag = Arc::clone(&slow_dropped);
            stream::once(async move {
                let _guard = DropFlag(flag);
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<u32, &str>(1)
            })
            .boxed()
        };
        let queued = {
            let started = Arc::clone(&queued_started);
            stream::once(async move {
                started.store(true, Ordering::SeqCst);
                Ok::<u32, &str>(2)
            })
            .boxed()
        };

        let results: Vec<_> = merge_bounded(vec![failing, slow, queued], 2).collect().await;
        assert_eq!(results, [Err("boom")]);
        assert!(slow_dropped.load(Ordering::SeqCst));
        assert!(!queued_started.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn run_wraps_unrecoverable_batch_errors() {
        let failing = stream::once(async {
            Err(CoreError::InvalidRequest {
                message: "bad endpoint".into(),
            })
        })
        .boxed();

        let snapshots: Vec<_> = CategoryAggregator::new(1)
            .run(
                vec![category("8")],
                vec![ready_batch(vec![event("1", &["8"], 1)]), failing],
            )
            .collect()
            .await;

        assert_eq!(snapshots.len(), 3);
        assert!(matches!(
            snapshots[2],
            Err(CoreError::Aggregation { completed: 1, .. })
        ));
    }
}
