//! HTTP client for the portal API.

mod types;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
pub use types::{
    AuthRequest, JOBS_PATH, LOGIN_PATH, LoginRequest, RequestKind, SIGNUP_PATH, ServerMessage,
    SignupRequest, VERIFY_PATH, VerifyRequest,
};

use crate::config::Config;
use crate::jobs::JobPosting;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Environment variable overriding the configured base URL.
pub const BASE_URL_ENV_VAR: &str = "CAREERHUB_API_URL";

/// Standard User-Agent header for careerhub API requests.
pub const USER_AGENT: &str = concat!("careerhub/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {path} failed")]
    Transport {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        path: &'static str,
        status: StatusCode,
        /// `msg` from the error body, when the server sent one.
        message: Option<String>,
    },
    #[error("unexpected response body from {path}")]
    Decode {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Server-provided message, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Resolves the base URL with precedence: explicit > env > config > default.
///
/// # Errors
/// Returns an error if the chosen URL does not parse.
pub fn resolve_base_url(explicit: Option<&str>, config_base_url: Option<&str>) -> Result<String> {
    let env_url = std::env::var(BASE_URL_ENV_VAR).ok();
    let candidates = [explicit, env_url.as_deref(), config_base_url];

    for candidate in candidates.into_iter().flatten() {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            url::Url::parse(trimmed).with_context(|| format!("Invalid API base URL: {trimmed}"))?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    Ok(DEFAULT_BASE_URL.to_string())
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Builds a client from config, honoring an explicit base URL override.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn from_config(config: &Config, base_url_override: Option<&str>) -> Result<Self> {
        let base_url = resolve_base_url(base_url_override, config.api_url.as_deref())?;
        Self::new(base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_jobs(&self) -> Result<Vec<JobPosting>, ApiError> {
        tracing::debug!(base_url = %self.base_url, "fetching job list");
        let response = self
            .http
            .get(self.endpoint(JOBS_PATH))
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: JOBS_PATH,
                source,
            })?;
        let entries: Vec<serde_json::Value> = Self::decode(JOBS_PATH, response).await?;
        Ok(parse_postings(entries))
    }

    pub async fn login(&self, body: &LoginRequest) -> Result<ServerMessage, ApiError> {
        self.post(LOGIN_PATH, body).await
    }

    pub async fn signup(&self, body: &SignupRequest) -> Result<ServerMessage, ApiError> {
        self.post(SIGNUP_PATH, body).await
    }

    pub async fn verify_signup(&self, body: &VerifyRequest) -> Result<ServerMessage, ApiError> {
        self.post(VERIFY_PATH, body).await
    }

    /// Sends whichever auth request the dialog produced.
    pub async fn send(&self, request: &AuthRequest) -> Result<ServerMessage, ApiError> {
        match request {
            AuthRequest::Login(body) => self.login(body).await,
            AuthRequest::Signup(body) => self.signup(body).await,
            AuthRequest::Verify(body) => self.verify_signup(body).await,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &'static str,
        body: &B,
    ) -> Result<ServerMessage, ApiError> {
        tracing::debug!(path, "posting auth request");
        let response = self
            .http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Transport { path, source })?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &'static str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ServerMessage>()
                .await
                .ok()
                .and_then(|body| body.msg);
            return Err(ApiError::Status {
                path,
                status,
                message,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode { path, source })
    }
}

/// Decodes each entry on its own. Entries that do not decode are logged and
/// dropped.
fn parse_postings(entries: Vec<serde_json::Value>) -> Vec<JobPosting> {
    let total = entries.len();
    let jobs: Vec<JobPosting> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let id = entry
                .get("_id")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);
            match serde_json::from_value::<JobPosting>(entry) {
                Ok(job) => Some(job),
                Err(err) => {
                    tracing::warn!(
                        index,
                        id = id.as_deref(),
                        error = %err,
                        "skipping malformed posting"
                    );
                    None
                }
            }
        })
        .collect();
    if jobs.len() < total {
        tracing::warn!(kept = jobs.len(), total, "some postings could not be decoded");
    }
    jobs
}
