//! Clap derive structures for the `feedline` CLI.
//!
//! Also compiled by `build.rs` for man page generation, so this file only
//! depends on clap, clap_complete, humantime and std.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// feedline -- follow natural events and repository activity
#[derive(Debug, Parser)]
#[command(
    name = "feedline",
    version,
    about = "Follow natural-event categories and repository activity from the command line",
    long_about = "Aggregates NASA EONET natural events per category and keeps a\n\
        capped, persisted feed of GitHub repository activity.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', env = "FEEDLINE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "FEEDLINE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Event query window in days
    #[arg(long, short = 'd', global = true)]
    pub days: Option<u32>,

    /// Repository to follow (owner/name)
    #[arg(long, short = 'r', env = "FEEDLINE_REPO", global = true)]
    pub repo: Option<String>,

    /// Directory for the activity snapshot and marker
    #[arg(long, env = "FEEDLINE_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List event categories with their event counts
    #[command(alias = "cat")]
    Categories(CategoriesArgs),

    /// List the events of one category
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Refresh and show repository activity
    #[command(alias = "act")]
    Activity(ActivityArgs),

    /// Keep refreshing and print new activity as it arrives
    Watch(WatchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct CategoriesArgs {
    /// Category requests in flight at once
    #[arg(long, short = 'j')]
    pub max_concurrent: Option<usize>,

    /// Hide categories without events
    #[arg(long)]
    pub non_empty: bool,
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Category id (see `feedline categories`)
    pub category: String,

    /// Only events with this status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Only events dated on or after this day (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    All,
    Open,
    Closed,
}

#[derive(Debug, Args)]
pub struct ActivityArgs {
    /// Show the persisted snapshot without contacting GitHub
    #[arg(long)]
    pub offline: bool,

    /// Show at most this many records
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Refresh period (e.g. 30s, 5m)
    #[arg(long, short = 'e', default_value = "60s", value_parser = humantime::parse_duration)]
    pub every: Duration,

    /// Also refresh event categories on every tick
    #[arg(long)]
    pub categories: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Write a default config file if none exists
    Init,

    /// Store a GitHub token in the keyring or config file
    SetToken {
        /// Read the token from stdin instead of prompting
        #[arg(long)]
        stdin: bool,

        /// Save to the config file instead of the keyring
        #[arg(long)]
        plaintext: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
