// Newest-first record collection with a size cap.

use std::collections::HashSet;

use serde::{Serialize, Serializer};

use crate::model::{Record, RecordId};

/// Records retained when no cap is configured.
pub const DEFAULT_CAP: usize = 50;

/// Ordered, de-duplicated, size-capped collection of records.
///
/// Newest first. No id appears twice, and `len() <= cap()` after every
/// operation; the oldest records are evicted to make room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate<T> {
    records: Vec<T>,
    cap: usize,
}

impl<T: Record> Default for Aggregate<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAP)
    }
}

impl<T: Record> Aggregate<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            records: Vec::new(),
            cap,
        }
    }

    /// Rebuild from a newest-first list (a loaded snapshot), dropping
    /// duplicates and anything beyond the cap.
    pub fn from_records(records: Vec<T>, cap: usize) -> Self {
        let mut aggregate = Self::new(cap);
        aggregate.records = dedupe(records);
        aggregate.records.truncate(cap);
        aggregate
    }

    /// Put `batch` (newest first) in front of the existing records.
    ///
    /// A record whose id is already present is replaced by the new copy
    /// at its new position. Returns how many ids were not present before.
    pub fn merge_newest(&mut self, batch: Vec<T>) -> usize {
        if batch.is_empty() {
            return 0;
        }

        let batch = dedupe(batch);
        let incoming: HashSet<&RecordId> = batch.iter().map(Record::id).collect();
        let added = incoming
            .iter()
            .filter(|id| !self.records.iter().any(|r| r.id() == **id))
            .count();

        let mut merged = Vec::with_capacity(batch.len() + self.records.len());
        let kept: Vec<T> = self
            .records
            .drain(..)
            .filter(|r| !incoming.contains(r.id()))
            .collect();
        merged.extend(batch.iter().cloned());
        merged.extend(kept);
        merged.truncate(self.cap);

        self.records = merged;
        added
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

/// First occurrence of each id wins.
fn dedupe<T: Record>(records: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.id().clone()))
        .collect()
}

// Serialized as the bare record list, the same shape as the snapshot file.
impl<T: Serialize> Serialize for Aggregate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Activity;
    use pretty_assertions::assert_eq;

    fn activity(id: u32, action: &str) -> Activity {
        Activity {
            id: RecordId::new(id.to_string()),
            actor: "octo".into(),
            repo: "ReactiveX/RxSwift".into(),
            action: action.into(),
            avatar_url: None,
            created_at: None,
        }
    }

    /// Ids `from..to`, newest (highest) first.
    fn batch(from: u32, to: u32) -> Vec<Activity> {
        (from..to).rev().map(|i| activity(i, "PushEvent")).collect()
    }

    fn ids(aggregate: &Aggregate<Activity>) -> Vec<String> {
        aggregate.records().iter().map(|a| a.id.to_string()).collect()
    }

    #[test]
    fn full_aggregate_drops_oldest_for_new_records() {
        let mut agg = Aggregate::from_records(batch(0, 50), 50);
        assert_eq!(agg.len(), 50);

        let added = agg.merge_newest(batch(50, 55));

        assert_eq!(added, 5);
        assert_eq!(agg.len(), 50);
        let expected: Vec<String> = (5..55).rev().map(|i| i.to_string()).collect();
        assert_eq!(ids(&agg), expected);
    }

    #[test]
    fn size_never_exceeds_cap() {
        let mut agg = Aggregate::new(10);
        for round in 0..5 {
            agg.merge_newest(batch(round * 7, round * 7 + 7));
            assert!(agg.len() <= agg.cap());
        }
        assert_eq!(agg.len(), 10);
    }

    #[test]
    fn redelivered_ids_are_not_duplicated() {
        let mut agg = Aggregate::new(50);
        agg.merge_newest(batch(0, 3));
        let added = agg.merge_newest(batch(1, 4));

        assert_eq!(added, 1);
        assert_eq!(ids(&agg), ["3", "2", "1", "0"]);
    }

    #[test]
    fn redelivered_id_moves_to_front_with_new_copy() {
        let mut agg = Aggregate::new(50);
        agg.merge_newest(vec![activity(2, "PushEvent"), activity(1, "PushEvent")]);
        agg.merge_newest(vec![activity(1, "ForkEvent")]);

        assert_eq!(ids(&agg), ["1", "2"]);
        assert_eq!(agg.records()[0].action, "ForkEvent");
    }

    #[test]
    fn duplicate_ids_in_one_batch_keep_first() {
        let mut agg = Aggregate::new(50);
        agg.merge_newest(vec![activity(1, "WatchEvent"), activity(1, "PushEvent")]);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg.records()[0].action, "WatchEvent");
    }

    #[test]
    fn empty_batch_changes_nothing() {
        let mut agg = Aggregate::from_records(batch(0, 3), 50);
        let before = agg.clone();
        assert_eq!(agg.merge_newest(Vec::new()), 0);
        assert_eq!(agg, before);
    }

    #[test]
    fn serializes_as_record_list() {
        let agg = Aggregate::from_records(vec![activity(7, "PushEvent")], 50);
        let json = serde_json::to_value(&agg).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["id"], "7");
    }
}
