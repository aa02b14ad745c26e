//! Configuration for the feedline CLI.
//!
//! TOML file + `FEEDLINE_*` environment layering, GitHub token
//! resolution (env var, keyring, plaintext) and translation to
//! `feedline_core::FeedConfig`. CLI flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use feedline_core::FeedConfig;

/// Keyring service name.
pub const KEYRING_SERVICE: &str = "feedline";
/// Keyring entry holding the GitHub token.
pub const KEYRING_TOKEN_ENTRY: &str = "github/token";
/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "FEEDLINE_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub eonet: EonetSection,

    #[serde(default)]
    pub github: GithubSection,

    /// Where the activity snapshot and marker live. Platform cache dir
    /// when unset.
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// HTTP timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Event query window, days.
    #[serde(default = "default_days")]
    pub days: u32,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Activity records kept.
    #[serde(default = "default_cap")]
    pub cap: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            days: default_days(),
            max_concurrent: default_max_concurrent(),
            cap: default_cap(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_days() -> u32 {
    360
}
fn default_max_concurrent() -> usize {
    feedline_core::aggregate::DEFAULT_MAX_CONCURRENT
}
fn default_cap() -> usize {
    feedline_core::aggregate::DEFAULT_CAP
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EonetSection {
    #[serde(default = "default_eonet_url")]
    pub base_url: String,
}

impl Default for EonetSection {
    fn default() -> Self {
        Self {
            base_url: default_eonet_url(),
        }
    }
}

fn default_eonet_url() -> String {
    feedline_core::FeedConfig::default().eonet_url
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GithubSection {
    #[serde(default = "default_github_url")]
    pub base_url: String,

    /// `owner/name` whose activity is followed.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Token in plaintext (prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable holding the token.
    pub token_env: Option<String>,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            base_url: default_github_url(),
            repo: default_repo(),
            token: None,
            token_env: None,
        }
    }
}

fn default_github_url() -> String {
    feedline_core::FeedConfig::default().github_url
}
fn default_repo() -> String {
    "ReactiveX/RxSwift".into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "feedline", "feedline")
}

/// Resolve the config file path: `FEEDLINE_CONFIG`, else platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for the activity snapshot and marker.
pub fn cache_dir(cfg: &Config) -> PathBuf {
    if let Some(ref dir) = cfg.cache_dir {
        return dir.clone();
    }
    project_dirs().map_or_else(
        || dirs_fallback(".cache"),
        |dirs| dirs.cache_dir().to_path_buf(),
    )
}

fn dirs_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("feedline");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path` (if present), then
/// `FEEDLINE_*` variables (`FEEDLINE_GITHUB__REPO=owner/name`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FEEDLINE_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the GitHub token: `token_env` variable, then the system
/// keyring, then plaintext. `None` means anonymous access.
pub fn resolve_token(github: &GithubSection) -> Option<SecretString> {
    // 1. Configured env var
    if let Some(ref env_name) = github.token_env {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Some(SecretString::from(val));
            }
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_TOKEN_ENTRY) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    github.token.clone().map(SecretString::from)
}

/// Store the GitHub token in the system keyring.
pub fn store_token(token: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_TOKEN_ENTRY)?;
    entry.set_password(token)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate `cfg` and build a `FeedConfig` (token included).
pub fn to_feed_config(cfg: &Config) -> Result<FeedConfig, ConfigError> {
    validate(cfg)?;

    Ok(FeedConfig {
        eonet_url: cfg.eonet.base_url.clone(),
        github_url: cfg.github.base_url.clone(),
        repo: cfg.github.repo.clone(),
        days: cfg.defaults.days,
        max_concurrent: cfg.defaults.max_concurrent,
        activity_cap: cfg.defaults.cap,
        cache_dir: cache_dir(cfg),
        timeout: Duration::from_secs(cfg.defaults.timeout),
        token: resolve_token(&cfg.github),
    })
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    for (field, raw) in [
        ("eonet.base_url", &cfg.eonet.base_url),
        ("github.base_url", &cfg.github.base_url),
    ] {
        url::Url::parse(raw).map_err(|e| ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL '{raw}': {e}"),
        })?;
    }

    let repo_ok = cfg
        .github
        .repo
        .split_once('/')
        .is_some_and(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'));
    if !repo_ok {
        return Err(ConfigError::Validation {
            field: "github.repo".into(),
            reason: format!("expected 'owner/name', got '{}'", cfg.github.repo),
        });
    }

    for (field, value) in [
        ("defaults.days", usize::try_from(cfg.defaults.days).unwrap_or(usize::MAX)),
        ("defaults.max_concurrent", cfg.defaults.max_concurrent),
        ("defaults.cap", cfg.defaults.cap),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation {
                field: field.into(),
                reason: "must be at least 1".into(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg.defaults.days, 360);
        assert_eq!(cfg.defaults.cap, 50);
        assert_eq!(cfg.defaults.max_concurrent, 2);
        assert_eq!(cfg.github.repo, "ReactiveX/RxSwift");
    }

    #[test]
    fn file_overrides_defaults_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[defaults]\ndays = 30\n\n[github]\nrepo = \"rust-lang/rust\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.days, 30);
        assert_eq!(cfg.defaults.cap, 50);
        assert_eq!(cfg.github.repo, "rust-lang/rust");
        assert_eq!(cfg.github.base_url, "https://api.github.com");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut cfg = Config::default();
        cfg.defaults.output = "json".into();
        cfg.cache_dir = Some(dir.path().join("cache"));

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.defaults.output, "json");
        assert_eq!(loaded.cache_dir, cfg.cache_dir);
    }

    #[test]
    fn feed_config_carries_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.cache_dir = Some(dir.path().to_path_buf());
        cfg.defaults.timeout = 5;

        let feed = to_feed_config(&cfg).unwrap();
        assert_eq!(feed.cache_dir, dir.path());
        assert_eq!(feed.timeout, Duration::from_secs(5));
        assert_eq!(feed.activity_path(), dir.path().join("activity.json"));
    }

    #[test]
    fn rejects_malformed_repo_and_zero_limits() {
        let mut cfg = Config::default();
        cfg.github.repo = "just-a-name".into();
        assert!(matches!(
            to_feed_config(&cfg),
            Err(ConfigError::Validation { ref field, .. }) if field == "github.repo"
        ));

        let mut cfg = Config::default();
        cfg.defaults.max_concurrent = 0;
        assert!(matches!(
            to_feed_config(&cfg),
            Err(ConfigError::Validation { ref field, .. }) if field == "defaults.max_concurrent"
        ));
    }

    #[test]
    fn rejects_bad_base_url() {
        let mut cfg = Config::default();
        cfg.eonet.base_url = "not a url".into();
        assert!(to_feed_config(&cfg).is_err());
    }

    #[test]
    fn token_env_wins_over_plaintext() {
        // PATH is set in any environment the tests run in.
        let expected = std::env::var("PATH").unwrap();
        let github = GithubSection {
            token: Some("from-file".into()),
            token_env: Some("PATH".into()),
            ..GithubSection::default()
        };

        let token = resolve_token(&github).unwrap();
        assert_eq!(token.expose_secret(), expected);
    }
}
