// GitHub repository events: wire types and endpoint builder
//
// `GET /repos/{owner}/{repo}/events` returns a JSON array, newest first.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::request::Request;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActivityEntry {
    pub id: Option<String>,
    /// Event type, e.g. `PushEvent`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub actor: Option<Actor>,
    pub repo: Option<RepoRef>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Actor {
    pub login: String,
    pub display_login: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepoRef {
    pub name: String,
}

/// `GET /repos/{owner}/{name}/events`, conditional on `marker` if given.
pub fn repo_events_request(repo: &str, marker: Option<String>) -> Result<Request, Error> {
    let valid = repo
        .split_once('/')
        .is_some_and(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'));
    if !valid {
        return Err(Error::InvalidParameter {
            name: "repo".into(),
            reason: format!("expected 'owner/name', got '{repo}'"),
        });
    }

    Ok(Request::new(format!("/repos/{repo}/events")).with_if_modified_since(marker))
}
