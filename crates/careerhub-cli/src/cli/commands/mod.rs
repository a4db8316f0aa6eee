//! CLI command handlers.

pub mod auth;
pub mod board;
pub mod config;
pub mod jobs;
