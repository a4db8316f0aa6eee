//! Full-screen job board for careerhub.

pub mod common;
pub mod effects;
pub mod events;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};

use anyhow::Result;
use careerhub_core::api::ApiClient;
use careerhub_core::auth::Tab;
use careerhub_core::config::Config;
pub use runtime::TuiRuntime;

use crate::overlays::{AuthOverlayState, Overlay};

/// Runs the interactive job board, optionally starting with the auth dialog open.
///
/// # Errors
/// Returns an error if stderr is not a terminal or the terminal fails.
pub async fn run_job_board(config: &Config, client: ApiClient, dialog: Option<Tab>) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The job board requires a terminal.\n\
             Use `careerhub jobs` for non-interactive output."
        );
    }

    tracing::info!(api_url = client.base_url(), "starting job board");
    let mut runtime = TuiRuntime::new(config, client)?;
    if let Some(tab) = dialog {
        runtime.open_overlay(Overlay::Auth(AuthOverlayState::open(
            tab,
            config.validation_policy(),
        )));
    }
    runtime.run()?;
    drop(runtime);

    writeln!(stderr(), "Goodbye!")?;
    Ok(())
}
