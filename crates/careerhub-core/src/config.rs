//! Configuration management for careerhub.
//!
//! Loads configuration from ${CAREERHUB_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::ValidationPolicy;

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for careerhub configuration and data directories.
    //!
    //! CAREERHUB_HOME resolution order:
    //! 1. CAREERHUB_HOME environment variable (if set)
    //! 2. ~/.config/careerhub (default)

    use std::path::PathBuf;

    /// Returns the careerhub home directory.
    pub fn careerhub_home() -> PathBuf {
        if let Ok(home) = std::env::var("CAREERHUB_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".careerhub"),
            |h| h.join(".config").join("careerhub"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        careerhub_home().join("config.toml")
    }

    /// Returns the directory the TUI writes its log files to.
    pub fn logs_dir() -> PathBuf {
        careerhub_home().join("logs")
    }

    /// Returns the file the board keeps its last fetched job list in.
    pub fn jobs_cache_path() -> PathBuf {
        careerhub_home().join("cache").join("jobs.json")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the portal API (falls back to the built-in default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Domain student emails must belong to.
    pub institution_domain: String,

    /// Background refresh interval for the job board in seconds (0 disables).
    pub refresh_interval_secs: u64,

    /// Per-request timeout in seconds (0 disables).
    pub request_timeout_secs: u64,

    /// Default tracing filter when `CAREERHUB_LOG` is unset.
    pub log_level: String,
}

impl Config {
    const DEFAULT_INSTITUTION_DOMAIN: &str = "iiitdwd.ac.in";
    const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
    /// Default is disabled
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 0;
    const DEFAULT_LOG_LEVEL: &str = "warn";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Builds the validation policy used by the auth forms.
    pub fn validation_policy(&self) -> ValidationPolicy {
        let domain = self.institution_domain.trim().trim_start_matches('@');
        if domain.is_empty() {
            ValidationPolicy::default()
        } else {
            ValidationPolicy::new(domain)
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Uses the embedded template for structure/comments and merges
    /// generated values from `Config::default()` into it.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let config = Config::default();
        let generated_toml =
            toml::to_string(&config).context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            institution_domain: Self::DEFAULT_INSTITUTION_DOMAIN.to_string(),
            refresh_interval_secs: Self::DEFAULT_REFRESH_INTERVAL_SECS,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
