//! `feedline watch`: background refresh, printing activity as it arrives.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use feedline_core::{Category, Feed, RefreshTargets, SnapshotStream};
use feedline_core::present::{ActivityRow, render_activity};

use crate::cli::WatchArgs;
use crate::config;
use crate::error::CliError;
use crate::output;

use super::Session;
use super::activity::print_rows;

/// Rows not printed before, remembering them in `seen`.
fn unseen(rows: Vec<ActivityRow>, seen: &mut HashSet<String>) -> Vec<ActivityRow> {
    rows.into_iter().filter(|r| seen.insert(r.id.clone())).collect()
}

/// One-line status for a published category listing.
fn category_summary(categories: &[Category]) -> String {
    let events: usize = categories.iter().map(|c| c.events.len()).sum();
    format!("{} categories, {events} events", categories.len())
}

/// Next category publish, or never when categories are not watched.
async fn next_categories(
    updates: &mut Option<SnapshotStream<Vec<Category>>>,
) -> Option<Arc<Vec<Category>>> {
    match updates {
        Some(updates) => updates.changed().await,
        None => std::future::pending().await,
    }
}

pub async fn handle(feed: &Feed, args: WatchArgs, session: &Session) -> Result<(), CliError> {
    let mut updates = feed.store().subscribe_activity();
    let mut category_updates = args
        .categories
        .then(|| feed.store().subscribe_categories());
    let mut seen = HashSet::new();

    // Persisted records first, then whatever the first poll adds.
    print_rows(&unseen(render_activity(updates.current()), &mut seen), session)?;
    feed.refresh_activity().await?;
    if args.categories {
        feed.refresh_categories().await?;
    }

    let targets = if args.categories {
        RefreshTargets::All
    } else {
        RefreshTargets::Activity
    };
    feed.spawn_refresh(args.every, targets).await;
    info!(every = %config::describe(args.every), "watching for activity");
    if session.interactive() {
        let status = format!("Refreshing every {}; Ctrl-C to stop", config::describe(args.every));
        eprintln!("{}", output::muted(&status, session.color));
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(categories) = next_categories(&mut category_updates) => {
                let summary = category_summary(&categories);
                info!(%summary, "categories refreshed");
                if !session.quiet {
                    eprintln!("{}", output::muted(&summary, session.color));
                }
            }
            snapshot = updates.changed() => {
                let Some(snapshot) = snapshot else { break };
                let fresh = unseen(render_activity(&snapshot), &mut seen);
                if fresh.is_empty() {
                    continue;
                }
                if session.interactive() {
                    let line = format!("+{} new", fresh.len());
                    eprintln!("{}", output::accent(&line, session.color));
                }
                print_rows(&fresh, session)?;
            }
        }
    }

    feed.shutdown().await;
    Ok(())
}
