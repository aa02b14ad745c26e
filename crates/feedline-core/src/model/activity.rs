// ── Repository activity domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, RecordId};

/// One entry of a repository's public activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: RecordId,
    /// Display login of whoever triggered the event.
    pub actor: String,
    /// `owner/name`.
    pub repo: String,
    /// Raw event type, e.g. `PushEvent`.
    pub action: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Activity {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}
