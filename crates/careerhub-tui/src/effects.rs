//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer never performs I/O or spawns tasks itself.

use careerhub_core::api::AuthRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Quit,
    /// Fetch the job list in the background.
    FetchJobs,
    /// Write the freshly fetched list to the on-disk cache.
    SaveJobs,
    /// Send a login, signup, or OTP request.
    SubmitAuth { request: AuthRequest },
}
