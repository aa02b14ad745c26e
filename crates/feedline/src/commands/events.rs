//! `feedline events <category>`: one category's events, newest first.

use chrono::{DateTime, NaiveDate, Utc};
use tabled::Tabled;

use feedline_core::present::{EventRow, render_events};
use feedline_core::{Category, CategoryId, EventFilter, EventStatus, Feed};

use crate::cli::{EventsArgs, StatusFilter};
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Tabled)]
struct EventTableRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&EventRow> for EventTableRow {
    fn from(r: &EventRow) -> Self {
        Self {
            date: r.date.clone(),
            title: r.title.clone(),
            status: r.status.clone(),
            id: r.id.clone(),
        }
    }
}

fn filters(args: &EventsArgs) -> Result<Vec<EventFilter>, CliError> {
    let mut filters = Vec::new();
    match args.status {
        StatusFilter::All => {}
        StatusFilter::Open => filters.push(EventFilter::Status(EventStatus::Open)),
        StatusFilter::Closed => filters.push(EventFilter::Status(EventStatus::Closed)),
    }
    if let Some(ref raw) = args.since {
        filters.push(EventFilter::Since(parse_day(raw)?));
    }
    Ok(filters)
}

/// `YYYY-MM-DD` at midnight UTC.
fn parse_day(raw: &str) -> Result<DateTime<Utc>, CliError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| CliError::Validation {
            field: "since".into(),
            reason: format!("expected YYYY-MM-DD, got '{raw}'"),
        })
}

fn narrow(mut category: Category, filters: &[EventFilter]) -> Category {
    category
        .events
        .retain(|e| filters.iter().all(|f| f.matches(e)));
    category
}

pub async fn handle(feed: &Feed, args: EventsArgs, session: &Session) -> Result<(), CliError> {
    let filters = filters(&args)?;
    let category = feed.category(&CategoryId::new(args.category)).await?;
    let total = category.event_count();
    let category = narrow(category, &filters);

    let rows = render_events(&category);
    let out = output::render_list(
        session.output,
        &rows,
        |r| EventTableRow::from(r),
        |r| r.id.clone(),
    )?;
    output::print_output(&out, session.quiet);

    if session.interactive() {
        let summary = format!("{}: {} of {total} events", category.name, rows.len());
        eprintln!("{}", output::muted(&summary, session.color));
    }
    Ok(())
}
