//! Job postings: wire model, filtering, sorting, and the listing pipeline.
//!
//! - `filter.rs`: `FilterState` and its pure reducer
//! - `sort.rs`: `SortMode` comparators
//! - `listing.rs`: filter + sort pipeline feeding the board
//! - `feed.rs`: last-known data with background revalidation

mod feed;
mod filter;
mod listing;
mod sort;

use std::fmt;

use chrono::{DateTime, Utc};
pub use feed::{FeedSnapshot, JobFeed};
pub use filter::{BatchYear, FilterAction, FilterFlag, FilterState};
pub use listing::{Listing, ListingAction, ListingView};
use serde::{Deserialize, Serialize};
pub use sort::SortMode;

/// Posting category as encoded by the API (`0` job, `1` internship).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Category {
    Job,
    Internship,
}

impl Category {
    pub fn code(self) -> u8 {
        match self {
            Category::Job => 0,
            Category::Internship => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Job => "Job",
            Category::Internship => "Internship",
        }
    }
}

impl TryFrom<u8> for Category {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Category::Job),
            1 => Ok(Category::Internship),
            other => Err(format!("Unknown job category: {other}")),
        }
    }
}

impl From<Category> for u8 {
    fn from(category: Category) -> Self {
        category.code()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A job or internship posting as returned by `GET /job/getAll`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub company_name: String,
    #[serde(default)]
    pub job_location: String,
    #[serde(default)]
    pub floated_by: String,
    pub category: Category,
    /// Two-digit graduation years allowed to apply.
    pub eligible_batch: Vec<u16>,
    pub stipend: f64,
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn is_eligible(&self, year: BatchYear) -> bool {
        self.eligible_batch.contains(&year.code())
    }

    /// Eligible batches as full years, e.g. "2024, 2025".
    pub fn batch_label(&self) -> String {
        self.eligible_batch
            .iter()
            .map(|year| (2000 + u32::from(*year)).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Formats a timestamp as a day-first calendar date (`18/10/2026`).
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Formats a stipend without a trailing `.0` for whole amounts.
pub fn format_stipend(stipend: f64) -> String {
    if stipend.fract() == 0.0 {
        format!("{stipend:.0}")
    } else {
        format!("{stipend:.2}")
    }
}
