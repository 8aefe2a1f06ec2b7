//! Web server module for receiving scheduler webhooks.
//!
//! Routes:
//! - `POST /`: CloudEvent delivery from the scheduler
//! - `GET /health`: liveness check

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, receive_event, AppState, HealthResponse};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(receive_event))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
