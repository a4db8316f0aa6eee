//! CLI entry and dispatch.

use anyhow::{Context, Result};
use careerhub_core::api::ApiClient;
use careerhub_core::auth::UserType;
use careerhub_core::config;
use careerhub_core::jobs::SortMode;
use careerhub_core::logging::{self, LogTarget};
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "careerhub")]
#[command(version)]
#[command(about = "Campus job board and portal login")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the portal API
    #[arg(long, global = true, value_name = "URL", env = "CAREERHUB_API_URL")]
    api_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the interactive job board (default when no command is given)
    Board {
        /// Start with the login dialog open
        #[arg(long, conflicts_with = "signup")]
        login: bool,
        /// Start with the signup dialog open
        #[arg(long)]
        signup: bool,
    },

    /// List postings with optional filters
    Jobs {
        /// Only full-time jobs
        #[arg(long, conflicts_with = "internships")]
        jobs: bool,
        /// Only internships
        #[arg(long)]
        internships: bool,
        /// Eligible batch, e.g. 2025 or 25 (repeatable)
        #[arg(long = "batch", value_name = "YEAR")]
        batches: Vec<u16>,
        /// Sort order (recent, stipend)
        #[arg(long, default_value_t = SortMode::Recent)]
        sort: SortMode,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Log in to the portal
    Login {
        /// Account type (outsider, student, alumni)
        #[arg(long)]
        usertype: UserType,
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account; password, confirmation and OTP are read from stdin
    Signup {
        /// Account type (outsider, student, alumni)
        #[arg(long)]
        usertype: UserType,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Short description, alumni only
        #[arg(long = "alumni-desc", value_name = "TEXT")]
        alumni_desc: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print a fresh config generated from defaults
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;

    let Cli { command, api_url } = cli;
    let command = command.unwrap_or(Commands::Board {
        login: false,
        signup: false,
    });

    // The board owns the terminal, so its logs go to a file.
    let target = match &command {
        Commands::Board { .. } => LogTarget::File(config::paths::logs_dir()),
        _ => LogTarget::Stderr,
    };
    let _log_guard = logging::init(&config.log_level, target)?;

    match command {
        Commands::Board { login, signup } => {
            let client = ApiClient::from_config(&config, api_url.as_deref())?;
            commands::board::run(&config, client, login, signup).await
        }

        Commands::Jobs {
            jobs,
            internships,
            batches,
            sort,
            json,
        } => {
            let client = ApiClient::from_config(&config, api_url.as_deref())?;
            commands::jobs::run(
                &client,
                &commands::jobs::JobsOptions {
                    jobs_only: jobs,
                    internships_only: internships,
                    batches,
                    sort,
                    json,
                },
            )
            .await
        }

        Commands::Login {
            usertype,
            email,
            password,
        } => {
            let client = ApiClient::from_config(&config, api_url.as_deref())?;
            commands::auth::login(&client, &config, usertype, email, password).await
        }

        Commands::Signup {
            usertype,
            name,
            email,
            alumni_desc,
        } => {
            let client = ApiClient::from_config(&config, api_url.as_deref())?;
            commands::auth::signup(
                &client,
                &config,
                commands::auth::SignupOptions {
                    usertype,
                    name,
                    email,
                    alumni_desc,
                },
            )
            .await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}
