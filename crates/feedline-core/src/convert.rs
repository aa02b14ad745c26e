// ── API-to-domain type conversions ──
//
// Bridges raw `feedline_api` wire types into canonical domain types.
// Entries missing a mandatory field are skipped rather than failing the
// whole batch; `records_from` does the skipping and logs what it dropped.

use chrono::{DateTime, Utc};
use tracing::debug;

use feedline_api::eonet::{self, CategoryEntry, EventEntry};
use feedline_api::github::ActivityEntry;

use crate::model::{Activity, Category, CategoryId, Event, RecordId};

/// A wire entry lacked a field the domain type cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingField(pub &'static str);

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an ISO-8601 datetime string, silently dropping unparseable values.
fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert every entry that can be converted, dropping the rest.
pub fn records_from<W, T>(entries: Vec<W>) -> Vec<T>
where
    T: TryFrom<W, Error = MissingField>,
{
    let total = entries.len();
    let records: Vec<T> = entries
        .into_iter()
        .filter_map(|entry| {
            T::try_from(entry)
                .map_err(|MissingField(field)| debug!(field, "skipping entry"))
                .ok()
        })
        .collect();

    if records.len() < total {
        debug!(kept = records.len(), total, "dropped incomplete entries");
    }
    records
}

// ── Category ───────────────────────────────────────────────────────

impl TryFrom<CategoryEntry> for Category {
    type Error = MissingField;

    fn try_from(entry: CategoryEntry) -> Result<Self, Self::Error> {
        let id = CategoryId::from(entry.id.as_ref().ok_or(MissingField("id"))?);
        let name = entry.title.ok_or(MissingField("title"))?;
        let endpoint = entry
            .link
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| format!("{}/{id}", eonet::CATEGORIES_ENDPOINT));

        Ok(Self {
            id,
            name,
            description: entry.description,
            endpoint,
            events: Vec::new(),
        })
    }
}

// ── Event ──────────────────────────────────────────────────────────

impl TryFrom<EventEntry> for Event {
    type Error = MissingField;

    fn try_from(entry: EventEntry) -> Result<Self, Self::Error> {
        let id = RecordId::from(entry.id.as_ref().ok_or(MissingField("id"))?);
        let title = entry.title.ok_or(MissingField("title"))?;
        let date = entry
            .geometries
            .first()
            .and_then(|g| parse_datetime(g.date.as_deref()));

        Ok(Self {
            id,
            title,
            description: entry.description.unwrap_or_default(),
            link: entry.link,
            categories: entry.categories.iter().map(|c| CategoryId::from(&c.id)).collect(),
            date,
            closed: parse_datetime(entry.closed.as_deref()),
        })
    }
}

// ── Activity ───────────────────────────────────────────────────────

impl TryFrom<ActivityEntry> for Activity {
    type Error = MissingField;

    fn try_from(entry: ActivityEntry) -> Result<Self, Self::Error> {
        let id = RecordId::from(entry.id.ok_or(MissingField("id"))?);
        let actor = entry.actor.ok_or(MissingField("actor"))?;
        let repo = entry.repo.ok_or(MissingField("repo"))?;
        let action = entry.kind.ok_or(MissingField("type"))?;

        Ok(Self {
            id,
            actor: actor.display_login.unwrap_or(actor.login),
            repo: repo.name,
            action,
            avatar_url: actor.avatar_url,
            created_at: parse_datetime(entry.created_at.as_deref()),
        })
    }
}
