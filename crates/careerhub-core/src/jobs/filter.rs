//! Filter state and its reducer.
//!
//! Every flag is a named field; updates go through `FilterState::reduce` so
//! the jobs/internships exclusivity lives in one place.

use std::fmt;

use enum_map::{Enum, EnumMap};

use super::{Category, JobPosting};

/// Graduation batches the board can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Enum)]
pub enum BatchYear {
    Y2022,
    Y2023,
    Y2024,
    Y2025,
    Y2026,
    Y2027,
}

impl BatchYear {
    pub const ALL: [BatchYear; 6] = [
        BatchYear::Y2022,
        BatchYear::Y2023,
        BatchYear::Y2024,
        BatchYear::Y2025,
        BatchYear::Y2026,
        BatchYear::Y2027,
    ];

    /// Two-digit code used in `eligibleBatch`.
    pub fn code(self) -> u16 {
        match self {
            BatchYear::Y2022 => 22,
            BatchYear::Y2023 => 23,
            BatchYear::Y2024 => 24,
            BatchYear::Y2025 => 25,
            BatchYear::Y2026 => 26,
            BatchYear::Y2027 => 27,
        }
    }

    pub fn full_year(self) -> u16 {
        2000 + self.code()
    }

    /// Accepts either the two-digit code (`24`) or the full year (`2024`).
    pub fn from_code(code: u16) -> Option<Self> {
        let short = if code >= 2000 { code - 2000 } else { code };
        Self::ALL.into_iter().find(|year| year.code() == short)
    }
}

impl fmt::Display for BatchYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BATCH", self.full_year())
    }
}

/// A single toggleable filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterFlag {
    MyJobs,
    AddJob,
    Jobs,
    Internships,
    Batch(BatchYear),
}

impl FilterFlag {
    pub fn label(self) -> String {
        match self {
            FilterFlag::MyJobs => "MY JOBS".to_string(),
            FilterFlag::AddJob => "ADD JOB".to_string(),
            FilterFlag::Jobs => "JOBS".to_string(),
            FilterFlag::Internships => "INTERNSHIPS".to_string(),
            FilterFlag::Batch(year) => year.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    Toggle(FilterFlag),
    Reset,
}

/// Active filters for the job board. Defaults to everything off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// UI flag only; postings carry no owner to match against.
    pub my_jobs: bool,
    /// UI flag only; opens the add-job mode.
    pub add_job: bool,
    pub jobs_only: bool,
    pub internships_only: bool,
    pub batches: EnumMap<BatchYear, bool>,
}

impl FilterState {
    /// Pure reducer: returns the state after applying `action`.
    ///
    /// Turning on jobs-only forces internships-only off and vice versa.
    #[must_use]
    pub fn reduce(mut self, action: FilterAction) -> Self {
        match action {
            FilterAction::Reset => return Self::default(),
            FilterAction::Toggle(flag) => match flag {
                FilterFlag::MyJobs => self.my_jobs = !self.my_jobs,
                FilterFlag::AddJob => self.add_job = !self.add_job,
                FilterFlag::Jobs => {
                    self.jobs_only = !self.jobs_only;
                    self.internships_only = false;
                }
                FilterFlag::Internships => {
                    self.internships_only = !self.internships_only;
                    self.jobs_only = false;
                }
                FilterFlag::Batch(year) => self.batches[year] = !self.batches[year],
            },
        }
        self
    }

    pub fn is_active(&self, flag: FilterFlag) -> bool {
        match flag {
            FilterFlag::MyJobs => self.my_jobs,
            FilterFlag::AddJob => self.add_job,
            FilterFlag::Jobs => self.jobs_only,
            FilterFlag::Internships => self.internships_only,
            FilterFlag::Batch(year) => self.batches[year],
        }
    }

    pub fn active_batches(&self) -> impl Iterator<Item = BatchYear> + '_ {
        self.batches
            .iter()
            .filter_map(|(year, active)| active.then_some(year))
    }

    /// Returns whether `job` passes every active filter.
    ///
    /// Checks run in a fixed order and stop at the first rejection. Both
    /// category flags at once is contradictory and rejects everything.
    pub fn accepts(&self, job: &JobPosting) -> bool {
        if self.jobs_only && self.internships_only {
            return false;
        }
        if self.jobs_only && job.category != Category::Job {
            return false;
        }
        if self.internships_only && job.category != Category::Internship {
            return false;
        }
        self.active_batches().all(|year| job.is_eligible(year))
    }

    pub fn apply(&self, jobs: &[JobPosting]) -> Vec<JobPosting> {
        jobs.iter().filter(|job| self.accepts(job)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::test_support::posting;

    fn sample() -> Vec<JobPosting> {
        vec![
            posting("Backend", Category::Job, &[24], 5000.0, (2024, 1, 1)),
            posting("Intern", Category::Internship, &[24], 8000.0, (2024, 2, 1)),
        ]
    }

    fn toggled(flags: &[FilterFlag]) -> FilterState {
        flags.iter().fold(FilterState::default(), |state, flag| {
            state.reduce(FilterAction::Toggle(*flag))
        })
    }

    #[test]
    fn test_default_accepts_everything() {
        assert_eq!(FilterState::default().apply(&sample()).len(), 2);
    }

    #[test]
    fn test_jobs_only_keeps_full_time_postings() {
        let result = toggled(&[FilterFlag::Jobs]).apply(&sample());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Backend");
    }

    #[test]
    fn test_internships_only_keeps_internships() {
        let result = toggled(&[FilterFlag::Internships]).apply(&sample());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Intern");
    }

    #[test]
    fn test_batch_flag_matches_both_sample_postings() {
        let result = toggled(&[FilterFlag::Batch(BatchYear::Y2024)]).apply(&sample());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_both_category_flags_reject_everything() {
        // Only reachable by building the state directly; the reducer never allows it.
        let state = FilterState {
            jobs_only: true,
            internships_only: true,
            ..FilterState::default()
        };
        assert!(state.apply(&sample()).is_empty());
    }

    #[test]
    fn test_category_toggles_are_mutually_exclusive() {
        let state = toggled(&[FilterFlag::Jobs, FilterFlag::Internships]);
        assert!(state.internships_only);
        assert!(!state.jobs_only);

        let state = state.reduce(FilterAction::Toggle(FilterFlag::Jobs));
        assert!(state.jobs_only);
        assert!(!state.internships_only);
    }

    #[test]
    fn test_toggling_jobs_twice_turns_it_off() {
        let state = toggled(&[FilterFlag::Jobs, FilterFlag::Jobs]);
        assert!(!state.jobs_only);
        assert!(!state.internships_only);
    }

    #[test]
    fn test_batch_toggle_leaves_other_flags_alone() {
        let before = toggled(&[FilterFlag::Jobs, FilterFlag::Batch(BatchYear::Y2025)]);
        let after = before
            .clone()
            .reduce(FilterAction::Toggle(FilterFlag::Batch(BatchYear::Y2023)));

        assert!(after.jobs_only);
        assert!(after.batches[BatchYear::Y2025]);
        assert!(after.batches[BatchYear::Y2023]);
        for year in [BatchYear::Y2022, BatchYear::Y2024, BatchYear::Y2026] {
            assert_eq!(after.batches[year], before.batches[year]);
        }
    }

    #[test]
    fn test_batch_flags_require_every_active_year() {
        let jobs = vec![
            posting("a", Category::Job, &[24, 25], 0.0, (2024, 1, 1)),
            posting("b", Category::Job, &[24], 0.0, (2024, 1, 1)),
            posting("c", Category::Job, &[25, 26], 0.0, (2024, 1, 1)),
        ];
        let state = toggled(&[
            FilterFlag::Batch(BatchYear::Y2024),
            FilterFlag::Batch(BatchYear::Y2025),
        ]);

        let titles: Vec<_> = state.apply(&jobs).into_iter().map(|j| j.title).collect();
        assert_eq!(titles, vec!["a"]);
    }

    #[test]
    fn test_superset_property_over_all_year_combinations() {
        let jobs = vec![
            posting("a", Category::Job, &[22, 24, 27], 0.0, (2024, 1, 1)),
            posting("b", Category::Job, &[23], 0.0, (2024, 1, 1)),
            posting("c", Category::Internship, &[22, 23, 24, 25, 26, 27], 0.0, (2024, 1, 1)),
        ];

        for mask in 0u32..(1 << BatchYear::ALL.len()) {
            let mut state = FilterState::default();
            for (bit, year) in BatchYear::ALL.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    state = state.reduce(FilterAction::Toggle(FilterFlag::Batch(*year)));
                }
            }
            for job in &jobs {
                let superset = state.active_batches().all(|y| job.eligible_batch.contains(&y.code()));
                assert_eq!(state.accepts(job), superset, "mask {mask:#08b} job {}", job.title);
            }
        }
    }

    #[test]
    fn test_ui_flags_do_not_filter() {
        let state = toggled(&[FilterFlag::MyJobs, FilterFlag::AddJob]);
        assert!(state.my_jobs && state.add_job);
        assert_eq!(state.apply(&sample()).len(), 2);
    }

    #[test]
    fn test_reset_clears_every_flag() {
        let state = toggled(&[
            FilterFlag::MyJobs,
            FilterFlag::Internships,
            FilterFlag::Batch(BatchYear::Y2026),
        ])
        .reduce(FilterAction::Reset);
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn test_batch_year_from_code() {
        assert_eq!(BatchYear::from_code(24), Some(BatchYear::Y2024));
        assert_eq!(BatchYear::from_code(2027), Some(BatchYear::Y2027));
        assert_eq!(BatchYear::from_code(21), None);
        assert_eq!(BatchYear::Y2022.to_string(), "2022 BATCH");
    }
}
