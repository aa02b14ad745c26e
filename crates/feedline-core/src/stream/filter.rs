// ── Filter predicates for event snapshots ──

use chrono::{DateTime, Utc};

use crate::model::{Event, EventStatus};

/// Filter applied to a category's events without refetching.
pub enum EventFilter {
    All,
    Status(EventStatus),
    /// Events dated at or after the given instant. Undated events never match.
    Since(DateTime<Utc>),
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Status(status) => event.status() == *status,
            Self::Since(cutoff) => event.date.is_some_and(|d| d >= *cutoff),
        }
    }

    pub fn apply<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::RecordId;
    use chrono::TimeZone;

    fn event(id: &str, day: Option<u32>, closed: bool) -> Event {
        let date = day.map(|d| Utc.with_ymd_and_hms(2017, 8, d, 0, 0, 0).unwrap());
        Event {
            id: RecordId::new(id),
            title: id.into(),
            description: String::new(),
            link: None,
            categories: std::collections::BTreeSet::new(),
            date,
            closed: if closed { date } else { None },
        }
    }

    #[test]
    fn status_and_since_filters() {
        let events = [event("a", Some(1), true), event("b", Some(10), false), event("c", None, false)];

        let open: Vec<_> = EventFilter::Status(EventStatus::Open)
            .apply(&events)
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(open, ["b", "c"]);

        let cutoff = Utc.with_ymd_and_hms(2017, 8, 5, 0, 0, 0).unwrap();
        let recent = EventFilter::Since(cutoff).apply(&events);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id.as_str(), "b");
    }

    #[test]
    fn all_matches_undated_and_closed() {
        let events = [event("fire", None, false), event("storm", Some(2), true)];
        assert_eq!(EventFilter::All.apply(&events).len(), 2);
    }
}
