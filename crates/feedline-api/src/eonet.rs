// EONET v2.1 wire types and endpoint builders
//
// `GET /categories` and `GET {category link}?days=N&status=open|closed`.
// Field sets are tolerant: everything optional that EONET has been seen
// to omit is an `Option` or defaulted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::request::Request;

/// Public EONET v2.1 API root.
pub const DEFAULT_BASE_URL: &str = "https://eonet.gsfc.nasa.gov/api/v2.1";
pub const CATEGORIES_ENDPOINT: &str = "/categories";
pub const EVENTS_ENDPOINT: &str = "/events";

// ── Identifiers ─────────────────────────────────────────────────────

/// EONET uses numeric ids for categories and string ids for events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// ── Categories ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryEntry {
    pub id: Option<WireId>,
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Absolute URL of this category's event listing.
    pub link: Option<String>,
}

// ── Events ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventsResponse {
    pub events: Vec<EventEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventEntry {
    pub id: Option<WireId>,
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub link: Option<String>,
    /// ISO-8601 close date; absent for open events.
    pub closed: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    #[serde(default)]
    pub geometries: Vec<Geometry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryRef {
    pub id: WireId,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Geometry {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

// ── Endpoint builders ───────────────────────────────────────────────

/// `GET /categories`
pub fn categories_request() -> Request {
    Request::new(CATEGORIES_ENDPOINT)
}

/// Events for one category endpoint over the last `days` days.
///
/// `status` is `"open"` or `"closed"`.
pub fn events_request(endpoint: &str, days: u32, status: &str) -> Result<Request, Error> {
    if days == 0 {
        return Err(Error::InvalidParameter {
            name: "days".into(),
            reason: "must be at least 1".into(),
        });
    }
    if endpoint.trim().is_empty() {
        return Err(Error::InvalidParameter {
            name: "endpoint".into(),
            reason: "category has no events link".into(),
        });
    }

    Ok(Request::new(endpoint)
        .with_query("days", days)
        .with_query("status", status))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_categories_with_numeric_ids() {
        let body = r#"{
            "title": "EONET Event Categories",
            "categories": [
                {"id": 8, "title": "Wildfires", "link": "https://eonet.test/api/v2.1/categories/8",
                 "description": "Wildland fires"},
                {"id": 10, "title": "Severe Storms", "description": ""}
            ]
        }"#;
        let parsed: CategoriesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.categories.len(), 2);
        assert_eq!(parsed.categories[0].id, Some(WireId::Number(8)));
        assert!(parsed.categories[1].link.is_none());
    }

    #[test]
    fn decodes_event_with_geometry() {
        let body = r#"{"events": [{
            "id": "EONET_354",
            "title": "Fire, CA",
            "categories": [{"id": 8, "title": "Wildfires"}],
            "geometries": [{"date": "2017-08-01T00:00:00Z", "type": "Point", "coordinates": [1, 2]}]
        }]}"#;
        let parsed: EventsResponse = serde_json::from_str(body).unwrap();
        let ev = &parsed.events[0];
        assert_eq!(ev.id.as_ref().unwrap().to_string(), "EONET_354");
        assert_eq!(ev.categories[0].id, WireId::Number(8));
        assert_eq!(ev.geometries[0].date.as_deref(), Some("2017-08-01T00:00:00Z"));
        assert!(ev.closed.is_none());
    }

    #[test]
    fn missing_events_array_is_an_error() {
        assert!(serde_json::from_str::<EventsResponse>(r#"{"title": "x"}"#).is_err());
    }

    #[test]
    fn events_request_carries_days_and_status() {
        let req = events_request("https://eonet.test/categories/8", 360, "closed").unwrap();
        assert_eq!(req.query().get("days").map(String::as_str), Some("360"));
        assert_eq!(req.query().get("status").map(String::as_str), Some("closed"));
    }

    #[test]
    fn events_request_rejects_zero_days() {
        let err = events_request("/events", 0, "open").unwrap_err();
        assert!(err.is_request_error());
    }
}
