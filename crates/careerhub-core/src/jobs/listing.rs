//! Filter + sort pipeline feeding the job board.

use super::{FilterAction, FilterState, JobPosting, SortMode};

/// Actions the board can apply to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingAction {
    Filter(FilterAction),
    Sort(SortMode),
}

/// What the board should show right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListingView<'a> {
    /// No data has arrived yet.
    Loading,
    /// Data is loaded but nothing survives the filters.
    NoMatch,
    Jobs(&'a [JobPosting]),
}

/// Fetched postings plus the filter/sort state applied to them.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    jobs: Option<Vec<JobPosting>>,
    filters: FilterState,
    sort: SortMode,
    displayed: Vec<JobPosting>,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from previously fetched data, if any.
    pub fn with_jobs(jobs: Option<&[JobPosting]>) -> Self {
        let mut listing = Self::new();
        if let Some(jobs) = jobs {
            listing.set_jobs(jobs.to_vec());
        }
        listing
    }

    /// Replaces the source data. Returns whether the displayed list changed.
    pub fn set_jobs(&mut self, jobs: Vec<JobPosting>) -> bool {
        let was_loading = self.jobs.is_none();
        self.jobs = Some(jobs);
        self.refresh() || was_loading
    }

    /// Applies a filter or sort action. Returns whether the displayed list changed.
    pub fn dispatch(&mut self, action: ListingAction) -> bool {
        match action {
            ListingAction::Filter(filter) => {
                self.filters = std::mem::take(&mut self.filters).reduce(filter);
            }
            ListingAction::Sort(mode) => self.sort = mode,
        }
        self.refresh()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    pub fn is_loaded(&self) -> bool {
        self.jobs.is_some()
    }

    pub fn total(&self) -> usize {
        self.jobs.as_ref().map_or(0, Vec::len)
    }

    pub fn displayed(&self) -> &[JobPosting] {
        &self.displayed
    }

    pub fn view(&self) -> ListingView<'_> {
        match &self.jobs {
            None => ListingView::Loading,
            Some(_) if self.displayed.is_empty() => ListingView::NoMatch,
            Some(_) => ListingView::Jobs(&self.displayed),
        }
    }

    /// Recomputes the displayed list; only swaps it in when it differs.
    fn refresh(&mut self) -> bool {
        let Some(jobs) = &self.jobs else {
            return false;
        };
        let mut next = self.filters.apply(jobs);
        self.sort.sort(&mut next);
        if next == self.displayed {
            return false;
        }
        self.displayed = next;
        true
    }
}
