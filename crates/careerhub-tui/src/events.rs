//! Events fed into the reducer.

use careerhub_core::api::RequestKind;
use careerhub_core::auth::AuthReply;
use careerhub_core::jobs::JobPosting;
use chrono::{DateTime, Utc};
use crossterm::event::Event;

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic timer; drives the spinner, toast expiry, and background refresh.
    Tick,
    Terminal(Event),
    JobsLoaded {
        result: Result<Vec<JobPosting>, String>,
        fetched_at: DateTime<Utc>,
    },
    AuthReplied {
        kind: RequestKind,
        reply: AuthReply,
    },
}
