//! Async effect handlers.
//!
//! Each handler performs one network call and turns the result into the
//! `UiEvent` the reducer expects.

use careerhub_core::api::{ApiClient, AuthRequest};
use careerhub_core::auth::AuthReply;
use chrono::Utc;

use crate::events::UiEvent;

pub async fn fetch_jobs(client: ApiClient) -> UiEvent {
    let result = client
        .fetch_jobs()
        .await
        .map_err(|err| format!("{:#}", anyhow::Error::new(err)));
    UiEvent::JobsLoaded {
        result,
        fetched_at: Utc::now(),
    }
}

pub async fn submit_auth(client: ApiClient, request: AuthRequest) -> UiEvent {
    let kind = request.kind();
    tracing::info!(?kind, "sending auth request");
    let reply = AuthReply::from(client.send(&request).await);
    UiEvent::AuthReplied { kind, reply }
}
