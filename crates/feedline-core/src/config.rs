// ── Runtime feed configuration ──
//
// Describes which feeds to follow and where to keep local state.
// Built by the CLI from feedline-config; core never reads config files.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::aggregate::{DEFAULT_CAP, DEFAULT_MAX_CONCURRENT};

/// File name of the activity snapshot inside `cache_dir`.
pub const ACTIVITY_FILE: &str = "activity.json";
/// File name of the category snapshot inside `cache_dir`.
pub const CATEGORIES_FILE: &str = "categories.json";
/// File name of the `Last-Modified` marker inside `cache_dir`.
pub const MARKER_FILE: &str = "modified.txt";

#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// EONET API root.
    pub eonet_url: String,
    /// GitHub API root.
    pub github_url: String,
    /// `owner/name` whose activity is followed.
    pub repo: String,
    /// Event query window, in days.
    pub days: u32,
    /// Category requests in flight at once.
    pub max_concurrent: usize,
    /// Activity records retained.
    pub activity_cap: usize,
    /// Directory holding the snapshot files and the marker.
    pub cache_dir: PathBuf,
    pub timeout: Duration,
    /// GitHub token; anonymous when absent.
    pub token: Option<SecretString>,
}

impl FeedConfig {
    pub fn activity_path(&self) -> PathBuf {
        self.cache_dir.join(ACTIVITY_FILE)
    }

    pub fn categories_path(&self) -> PathBuf {
        self.cache_dir.join(CATEGORIES_FILE)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.cache_dir.join(MARKER_FILE)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            eonet_url: feedline_api::eonet::DEFAULT_BASE_URL.into(),
            github_url: feedline_api::github::DEFAULT_BASE_URL.into(),
            repo: "ReactiveX/RxSwift".into(),
            days: 360,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            activity_cap: DEFAULT_CAP,
            cache_dir: std::env::temp_dir().join("feedline"),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}
