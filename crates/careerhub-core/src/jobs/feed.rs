//! Last-known job data with background revalidation.
//!
//! The board shows whatever was fetched last while a refetch runs. A failed
//! refetch keeps the previous data; only one fetch is in flight at a time.
//! The last good list is also kept on disk so the next launch starts from it.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::JobPosting;

/// The last successfully fetched job list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub jobs: Vec<JobPosting>,
    pub fetched_at: DateTime<Utc>,
}

impl FeedSnapshot {
    /// Reads a snapshot written by [`FeedSnapshot::save`].
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read job cache {}", path.display()));
            }
        };
        let snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse job cache {}", path.display()))?;
        Ok(Some(snapshot))
    }

    /// Writes the snapshot as JSON (temp file + rename).
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content = serde_json::to_string(self).context("Failed to serialize job cache")?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write job cache to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobFeed {
    snapshot: Option<FeedSnapshot>,
    in_flight: bool,
    refresh_interval: Option<Duration>,
    last_attempt: Option<Instant>,
    last_error: Option<String>,
}

impl JobFeed {
    /// `refresh_interval` of `None` disables periodic revalidation.
    pub fn new(refresh_interval: Option<Duration>) -> Self {
        Self {
            refresh_interval,
            ..Self::default()
        }
    }

    /// Starts from a snapshot saved by an earlier session. The first
    /// `begin_revalidate` still fetches.
    pub fn with_snapshot(
        refresh_interval: Option<Duration>,
        snapshot: Option<FeedSnapshot>,
    ) -> Self {
        Self {
            snapshot,
            ..Self::new(refresh_interval)
        }
    }

    pub fn snapshot(&self) -> Option<&FeedSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn cached(&self) -> Option<&[JobPosting]> {
        self.snapshot.as_ref().map(|s| s.jobs.as_slice())
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.as_ref().map(|s| s.fetched_at)
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns true if a fetch should start now, and marks it in flight.
    ///
    /// The first call always starts a fetch; later calls wait for the refresh
    /// interval unless `force` is set.
    pub fn begin_revalidate(&mut self, now: Instant, force: bool) -> bool {
        if self.in_flight {
            return false;
        }
        let due = match (self.last_attempt, self.refresh_interval) {
            (None, _) => true,
            _ if force => true,
            (Some(last), Some(interval)) => now.saturating_duration_since(last) >= interval,
            (Some(_), None) => false,
        };
        if due {
            self.in_flight = true;
            self.last_attempt = Some(now);
        }
        due
    }

    /// Records a finished fetch. Returns the fresh postings on success.
    pub fn complete(
        &mut self,
        result: Result<Vec<JobPosting>, String>,
        fetched_at: DateTime<Utc>,
    ) -> Option<&[JobPosting]> {
        self.in_flight = false;
        match result {
            Ok(jobs) => {
                let missing_batch = jobs.iter().filter(|j| j.eligible_batch.is_empty()).count();
                if missing_batch > 0 {
                    tracing::warn!(count = missing_batch, "postings without an eligible batch");
                }
                tracing::debug!(count = jobs.len(), "job list refreshed");
                self.last_error = None;
                self.snapshot = Some(FeedSnapshot { jobs, fetched_at });
                self.cached()
            }
            Err(error) => {
                tracing::warn!(%error, has_cached = self.snapshot.is_some(), "job list fetch failed");
                self.last_error = Some(error);
                None
            }
        }
    }
}
