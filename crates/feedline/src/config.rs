//! CLI-side configuration: re-exports from `feedline-config` plus the
//! layer that applies command-line flags on top of the file settings.

use std::time::Duration;

pub use feedline_config::{
    Config, config_path, load_config, resolve_token, save_config, store_token,
};

use feedline_core::FeedConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Apply global flags to a loaded config.
///
/// Flags win over file and environment values.
pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(timeout) = global.timeout {
        cfg.defaults.timeout = timeout;
    }
    if let Some(days) = global.days {
        cfg.defaults.days = days;
    }
    if let Some(ref repo) = global.repo {
        cfg.github.repo.clone_from(repo);
    }
    if let Some(ref dir) = global.cache_dir {
        cfg.cache_dir = Some(dir.clone());
    }
}

/// Load config from file and environment, then apply flags.
pub fn load_with_overrides(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config()?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

/// Validate and translate to the runtime feed configuration.
pub fn feed_config(cfg: &Config) -> Result<FeedConfig, CliError> {
    let feed = feedline_config::to_feed_config(cfg)?;
    tracing::debug!(
        repo = %feed.repo,
        days = feed.days,
        timeout = ?feed.timeout,
        cache_dir = %feed.cache_dir.display(),
        "resolved feed configuration"
    );
    Ok(feed)
}

/// Output format: flag, then `defaults.output`, then table.
pub fn output_format(global: &GlobalOpts, cfg: Option<&Config>) -> OutputFormat {
    if let Some(format) = global.output {
        return format;
    }
    let configured = cfg.map(|c| c.defaults.output.as_str());
    match configured {
        Some("json") => OutputFormat::Json,
        Some("json-compact") => OutputFormat::JsonCompact,
        Some("yaml") => OutputFormat::Yaml,
        Some("plain") => OutputFormat::Plain,
        _ => OutputFormat::Table,
    }
}

/// Color mode: flag, then `defaults.color`, then auto.
pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> ColorMode {
    if let Some(mode) = global.color {
        return mode;
    }
    match cfg.defaults.color.as_str() {
        "always" => ColorMode::Always,
        "never" => ColorMode::Never,
        _ => ColorMode::Auto,
    }
}

/// Human-readable form of a duration for status lines.
pub fn describe(every: Duration) -> String {
    humantime::format_duration(every).to_string()
}
