use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::JobPosting;

/// Ordering applied to the filtered postings. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Earliest start date first.
    #[default]
    Recent,
    /// Highest stipend first.
    Stipend,
}

impl SortMode {
    pub fn all() -> &'static [SortMode] {
        &[SortMode::Recent, SortMode::Stipend]
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Recent => "RECENT",
            SortMode::Stipend => "STIPEND",
        }
    }

    /// Stable in-place sort; ties keep their fetched order.
    pub fn sort(self, jobs: &mut [JobPosting]) {
        match self {
            SortMode::Recent => jobs.sort_by(|a, b| a.start_date.cmp(&b.start_date)),
            SortMode::Stipend => jobs.sort_by(|a, b| b.stipend.total_cmp(&a.stipend)),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortMode::Recent => "recent",
            SortMode::Stipend => "stipend",
        })
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(SortMode::Recent),
            "stipend" => Ok(SortMode::Stipend),
            other => Err(format!("Unknown sort mode: {other} (expected recent or stipend)")),
        }
    }
}
