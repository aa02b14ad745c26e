//! Command dispatch: bridges CLI args -> Feed operations -> output formatting.

pub mod activity;
pub mod categories;
pub mod config_cmd;
pub mod events;
pub mod watch;

use feedline_core::Feed;

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

/// Output settings resolved once per invocation.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Session {
    /// Progress and status lines only make sense for people reading tables.
    pub fn interactive(&self) -> bool {
        !self.quiet && self.output == OutputFormat::Table
    }
}

/// Dispatch a feed-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, feed: &Feed, session: &Session) -> Result<(), CliError> {
    match cmd {
        Command::Categories(args) => categories::handle(feed, args, session).await,
        Command::Events(args) => events::handle(feed, args, session).await,
        Command::Activity(args) => activity::handle(feed, args, session).await,
        Command::Watch(args) => watch::handle(feed, args, session).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
