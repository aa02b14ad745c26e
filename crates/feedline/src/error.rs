//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use feedline_config::ConfigError;
use feedline_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const IO: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Network ──────────────────────────────────────────────────────
    #[error("Could not fetch from the feed")]
    #[diagnostic(
        code(feedline::fetch_failed),
        help("Check your network connection, or raise --timeout.\nCause: {cause}")
    )]
    FetchFailed { cause: String },

    #[error("Category download stopped after {completed} batch(es)")]
    #[diagnostic(
        code(feedline::aggregation),
        help("A category request could not be built: {cause}\nCheck --days and eonet.base_url.")
    )]
    Aggregation { completed: usize, cause: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(feedline::not_found),
        help("Run: feedline {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(feedline::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration problem: {message}")]
    #[diagnostic(
        code(feedline::config),
        help("Inspect the effective settings with: feedline config show")
    )]
    Config { message: String },

    #[error("Could not use the system keyring")]
    #[diagnostic(
        code(feedline::keyring),
        help("Retry with --plaintext to keep the token in the config file.\nCause: {cause}")
    )]
    Keyring { cause: String },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Could not write {}", path.display())]
    #[diagnostic(
        code(feedline::persistence),
        help("Check permissions, or pick another location with --cache-dir.")
    )]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(feedline::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FetchFailed { .. } | Self::Aggregation { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config { .. } | Self::Keyring { .. } => exit_code::CONFIG,
            Self::Persistence { .. } | Self::Io(_) => exit_code::IO,
            Self::Internal(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Fetch { source } => Self::FetchFailed {
                cause: source.to_string(),
            },

            CoreError::InvalidRequest { message } => Self::Validation {
                field: "request".into(),
                reason: message,
            },

            CoreError::Aggregation { completed, source } => Self::Aggregation {
                completed,
                cause: source.to_string(),
            },

            CoreError::CategoryNotFound { identifier } => Self::NotFound {
                resource_type: "category".into(),
                identifier,
                list_command: "categories".into(),
            },

            CoreError::Persistence { path, source } => Self::Persistence { path, source },

            CoreError::Config { message } => Self::Config { message },

            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Keyring(e) => Self::Keyring {
                cause: e.to_string(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
