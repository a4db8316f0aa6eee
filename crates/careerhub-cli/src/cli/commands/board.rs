//! Interactive job board.

use anyhow::Result;
use careerhub_core::api::ApiClient;
use careerhub_core::config::Config;

#[cfg(feature = "tui")]
pub async fn run(config: &Config, client: ApiClient, login: bool, signup: bool) -> Result<()> {
    use careerhub_core::auth::Tab;

    let dialog = if login {
        Some(Tab::Login)
    } else if signup {
        Some(Tab::Signup)
    } else {
        None
    };
    careerhub_tui::run_job_board(config, client, dialog).await
}

#[cfg(not(feature = "tui"))]
pub async fn run(_config: &Config, _client: ApiClient, _login: bool, _signup: bool) -> Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}
