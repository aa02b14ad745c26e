//! `feedline categories`: fold every category's events with a spinner.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use feedline_core::{Category, Feed};
use feedline_core::present::{CategoryRow, render_categories};

use crate::cli::CategoriesArgs;
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Tabled)]
struct CategoryTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Category")]
    name: String,
    #[tabled(rename = "Events")]
    count: usize,
}

impl From<&CategoryRow> for CategoryTableRow {
    fn from(r: &CategoryRow) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            count: r.count,
        }
    }
}

fn spinner(enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_message("Downloading categories");
    bar
}

/// Drive the fold to completion, reporting each merged batch.
async fn load(feed: &Feed, bar: &ProgressBar) -> Result<Arc<Vec<Category>>, CliError> {
    let mut updates = feed.category_updates().await;
    let mut last = Arc::new(Vec::new());
    let mut batches = 0_usize;

    while let Some(snapshot) = updates.next().await {
        let snapshot = snapshot?;
        if batches == 0 {
            bar.set_message(format!("Downloading events for {} categories", snapshot.len()));
        } else {
            let events: usize = snapshot.iter().map(Category::event_count).sum();
            bar.set_message(format!("{batches}/{} categories, {events} events", snapshot.len()));
        }
        batches += 1;
        last = snapshot;
    }
    Ok(last)
}

pub async fn handle(feed: &Feed, args: CategoriesArgs, session: &Session) -> Result<(), CliError> {
    let bar = spinner(session.interactive() && std::io::stderr().is_terminal());
    let result = load(feed, &bar).await;
    bar.finish_and_clear();
    let categories = result?;

    let mut rows = render_categories(&categories);
    if args.non_empty {
        rows.retain(|r| r.has_events);
    }

    let out = output::render_list(
        session.output,
        &rows,
        |r| CategoryTableRow::from(r),
        |r| r.id.clone(),
    )?;
    output::print_output(&out, session.quiet);
    Ok(())
}
