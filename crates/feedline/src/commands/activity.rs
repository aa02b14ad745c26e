//! `feedline activity`: refresh the persisted activity feed and show it.

use tabled::Tabled;

use feedline_core::Feed;
use feedline_core::present::{ActivityRow, render_activity};

use crate::cli::ActivityArgs;
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Tabled)]
struct ActivityTableRow {
    #[tabled(rename = "Actor")]
    title: String,
    #[tabled(rename = "Activity")]
    detail: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&ActivityRow> for ActivityTableRow {
    fn from(r: &ActivityRow) -> Self {
        Self {
            title: r.title.clone(),
            detail: r.detail.clone(),
            id: r.id.clone(),
        }
    }
}

/// Render rows in the session's format and print them.
pub(crate) fn print_rows(rows: &[ActivityRow], session: &Session) -> Result<(), CliError> {
    let out = output::render_list(
        session.output,
        rows,
        |r| ActivityTableRow::from(r),
        |r| r.id.clone(),
    )?;
    output::print_output(&out, session.quiet);
    Ok(())
}

pub async fn handle(feed: &Feed, args: ActivityArgs, session: &Session) -> Result<(), CliError> {
    let refresh = if args.offline {
        None
    } else {
        Some(feed.refresh_activity().await?)
    };

    let mut rows = render_activity(&feed.store().activity_snapshot());
    if let Some(limit) = args.limit {
        rows.truncate(limit);
    }
    print_rows(&rows, session)?;

    if let (Some(outcome), true) = (refresh, session.interactive()) {
        let summary = format!("+{} new, {} kept", outcome.added, outcome.total);
        eprintln!("{}", output::accent(&summary, session.color));
    }
    Ok(())
}
