//! Application state composition.
//!
//! ```text
//! AppState
//! ├── board: BoardState          (listing, feed, selection, toast)
//! └── overlay: Option<Overlay>   (auth dialog)
//! ```
//!
//! The overlay lives beside the board so its key handler can take
//! `&mut self` while reading `&BoardState`.

use std::time::{Duration, Instant};

use careerhub_core::auth::ValidationPolicy;
use careerhub_core::config::Config;
use careerhub_core::jobs::{FeedSnapshot, JobFeed, JobPosting, Listing, ListingAction};

use crate::overlays::Overlay;

/// How long a toast stays on the status line.
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Info,
            shown_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= TOAST_DURATION
    }
}

/// Job board state outside any overlay.
#[derive(Debug)]
pub struct BoardState {
    pub listing: Listing,
    pub feed: JobFeed,
    /// Index into the displayed postings.
    pub selected: usize,
    pub toast: Option<Toast>,
    pub policy: ValidationPolicy,
    pub api_url: String,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl BoardState {
    pub fn new(config: &Config, api_url: impl Into<String>) -> Self {
        Self::with_cached(config, api_url, None)
    }

    /// Shows `cached` right away; the first tick still revalidates it.
    pub fn with_cached(
        config: &Config,
        api_url: impl Into<String>,
        cached: Option<FeedSnapshot>,
    ) -> Self {
        let feed = JobFeed::with_snapshot(config.refresh_interval(), cached);
        Self {
            listing: Listing::with_jobs(feed.cached()),
            feed,
            selected: 0,
            toast: None,
            policy: config.validation_policy(),
            api_url: api_url.into(),
            spinner_frame: 0,
            should_quit: false,
        }
    }

    pub fn selected_job(&self) -> Option<&JobPosting> {
        self.listing.displayed().get(self.selected)
    }

    /// Applies a filter/sort action and keeps the selection in range.
    pub fn dispatch(&mut self, action: ListingAction) {
        if self.listing.dispatch(action) {
            self.selected = 0;
        }
    }

    pub fn select_next(&mut self) {
        let len = self.listing.displayed().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        let len = self.listing.displayed().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn show_toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
    }
}

pub struct AppState {
    pub board: BoardState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(config: &Config, api_url: impl Into<String>) -> Self {
        Self::with_cached(config, api_url, None)
    }

    pub fn with_cached(
        config: &Config,
        api_url: impl Into<String>,
        cached: Option<FeedSnapshot>,
    ) -> Self {
        Self {
            board: BoardState::with_cached(config, api_url, cached),
            overlay: None,
        }
    }
}
