//! Non-interactive job listing.

use anyhow::{Context, Result};
use careerhub_core::api::ApiClient;
use careerhub_core::jobs::{
    BatchYear, FilterAction, FilterFlag, JobPosting, Listing, ListingAction, SortMode,
    format_date, format_stipend,
};
use comfy_table::{ContentArrangement, Table};

const TABLE_WIDTH: u16 = 120;

pub struct JobsOptions {
    pub jobs_only: bool,
    pub internships_only: bool,
    /// Two-digit codes or full years.
    pub batches: Vec<u16>,
    pub sort: SortMode,
    pub json: bool,
}

pub async fn run(client: &ApiClient, options: &JobsOptions) -> Result<()> {
    let mut listing = build_listing(options)?;
    let jobs = client
        .fetch_jobs()
        .await
        .with_context(|| format!("fetch postings from {}", client.base_url()))?;
    tracing::debug!(count = jobs.len(), "fetched postings");

    listing.set_jobs(jobs);
    let displayed = listing.displayed();

    if options.json {
        let json = serde_json::to_string_pretty(displayed).context("serialize postings")?;
        println!("{json}");
    } else if displayed.is_empty() {
        println!("No Match Found");
    } else {
        println!("{}", render_table(displayed));
    }
    Ok(())
}

/// Applies the requested filters and sort before any data arrives.
fn build_listing(options: &JobsOptions) -> Result<Listing> {
    let mut actions = Vec::new();
    if options.jobs_only {
        actions.push(FilterFlag::Jobs);
    }
    if options.internships_only {
        actions.push(FilterFlag::Internships);
    }

    let mut years = options
        .batches
        .iter()
        .map(|code| {
            BatchYear::from_code(*code)
                .with_context(|| format!("Unknown batch: {code} (expected 2022 to 2027)"))
        })
        .collect::<Result<Vec<_>>>()?;
    // Toggling twice would switch a batch back off.
    years.sort_unstable();
    years.dedup();
    actions.extend(years.into_iter().map(FilterFlag::Batch));

    let mut listing = Listing::new();
    for flag in actions {
        listing.dispatch(ListingAction::Filter(FilterAction::Toggle(flag)));
    }
    listing.dispatch(ListingAction::Sort(options.sort));
    Ok(listing)
}

fn render_table(jobs: &[JobPosting]) -> String {
    let mut table = Table::new();
    table.set_width(TABLE_WIDTH);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Title", "Company", "Type", "Batch", "Stipend", "Start"]);

    for job in jobs {
        table.add_row(vec![
            job.title.clone(),
            job.company_name.clone(),
            job.category.label().to_string(),
            job.batch_label(),
            format_stipend(job.stipend),
            format_date(&job.start_date),
        ]);
    }

    table.to_string()
}
