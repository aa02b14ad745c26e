// ── Display projections ──
//
// Pure functions from current state to display rows. They never mutate
// their input and can be re-run against any snapshot.

use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::model::{Activity, Category, Event};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    /// `"{name} ({count})"`
    pub label: String,
    pub description: String,
    pub count: usize,
    /// Rows without events are shown but not selectable.
    pub has_events: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD`, empty when undated.
    pub date: String,
    pub status: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRow {
    pub id: String,
    pub title: String,
    pub detail: String,
    pub avatar_url: Option<String>,
}

/// Categories sorted by name with their event counts.
pub fn render_categories(categories: &[Category]) -> Vec<CategoryRow> {
    let mut rows: Vec<CategoryRow> = categories
        .iter()
        .map(|c| CategoryRow {
            id: c.id.to_string(),
            name: c.name.clone(),
            label: format!("{} ({})", c.name, c.event_count()),
            description: c.description.clone(),
            count: c.event_count(),
            has_events: c.event_count() > 0,
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

/// Events of one category, newest first.
pub fn render_events(category: &Category) -> Vec<EventRow> {
    let mut events: Vec<&Event> = category.events.iter().collect();
    events.sort_by(|a, b| Event::compare_dates(a, b));
    events
        .into_iter()
        .map(|e| EventRow {
            id: e.id.to_string(),
            title: e.title.clone(),
            date: e
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            status: e.status().to_string(),
            link: e.link.clone(),
        })
        .collect()
}

pub fn render_activity(aggregate: &Aggregate<Activity>) -> Vec<ActivityRow> {
    aggregate
        .records()
        .iter()
        .map(|a| ActivityRow {
            id: a.id.to_string(),
            title: a.actor.clone(),
            detail: format!("{}, {}", a.repo, action_label(&a.action)),
            avatar_url: a.avatar_url.clone(),
        })
        .collect()
}

/// `PushEvent` -> `push`
pub fn action_label(action: &str) -> String {
    action.replace("Event", "").to_lowercase()
}
