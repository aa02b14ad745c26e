// ── Natural event domain type ──

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{CategoryId, Record, RecordId};

/// Whether an event is still ongoing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    Open,
    Closed,
}

/// A natural event (wildfire, storm, eruption...).
///
/// Linked to categories by id membership only; a category never owns
/// the canonical copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub link: Option<String>,
    #[serde(default)]
    pub categories: BTreeSet<CategoryId>,
    /// Date of the first recorded geometry.
    pub date: Option<DateTime<Utc>>,
    pub closed: Option<DateTime<Utc>>,
}

impl Event {
    pub fn status(&self) -> EventStatus {
        if self.closed.is_some() {
            EventStatus::Closed
        } else {
            EventStatus::Open
        }
    }

    pub fn is_in(&self, category: &CategoryId) -> bool {
        self.categories.contains(category)
    }

    /// Newest first; undated events sort last.
    pub fn compare_dates(a: &Self, b: &Self) -> Ordering {
        match (a.date, b.date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl Record for Event {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date
    }
}
