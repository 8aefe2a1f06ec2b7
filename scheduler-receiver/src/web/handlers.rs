//! HTTP endpoint handlers.
//!
//! These handlers are thin adapters: they hand the raw headers and body to
//! the `Receiver` and write back whatever it returns.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::receiver::Receiver;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub receiver: Arc<Receiver>,
}

impl AppState {
    pub fn new(receiver: Receiver) -> Self {
        Self {
            receiver: Arc::new(receiver),
        }
    }

    /// Build the state from configuration alone.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Receiver::from_config(config))
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// CloudEvent Receiver
// =============================================================================

/// Scheduler webhook endpoint.
///
/// Accepts binary- and structured-mode CloudEvents and replies according to
/// the configured reply mode.
pub async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    debug!(
        has_event_id = headers.contains_key("ce-id"),
        body_length = body.len(),
        reply_mode = %state.receiver.reply_mode(),
        "scheduler_webhook_received"
    );

    state.receiver.handle(&headers, &body)
}
