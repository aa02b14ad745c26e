// ── Category domain type ──

use serde::{Deserialize, Serialize};

use super::{CategoryId, Event, RecordId};

/// An event category together with the events merged into it so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Absolute URL (or path) of this category's event listing.
    pub endpoint: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Category {
    /// Whether an event with this id has already been merged in.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.events.iter().any(|e| &e.id == id)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}
