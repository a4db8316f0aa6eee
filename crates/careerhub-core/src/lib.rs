//! Core careerhub library (job listings, auth flow, API client, config).

pub mod api;
pub mod auth;
pub mod config;
pub mod jobs;
pub mod logging;
