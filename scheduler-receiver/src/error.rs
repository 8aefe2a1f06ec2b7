//! Error taxonomy for the webhook receiver.
//!
//! Only one error is a client error: a request without an event id. Every
//! other failure is an unexpected fault and is reported as a 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::receiver::Reply;

/// Fixed body returned when the event id is missing or empty.
pub const MISSING_EVENT_ID_MESSAGE: &str = "Bad Request: expected header ce-id";

/// Failure while turning an event's `data` into a typed payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no decoder registered for event type {0}")]
    UnknownType(String),

    #[error("event carries no data")]
    MissingData,

    #[error("unsupported data content type {0}")]
    UnsupportedContentType(String),

    #[error("invalid event data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while handling a single webhook request.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("{}", MISSING_EVENT_ID_MESSAGE)]
    MissingEventId,

    #[error("unsupported specversion {0}")]
    UnsupportedSpecVersion(String),

    #[error("invalid event time {value}: {source}")]
    InvalidTime {
        value: String,
        source: chrono::ParseError,
    },

    #[error("header {0} is not valid ASCII")]
    InvalidHeader(String),

    #[error("malformed structured event: {0}")]
    MalformedEvent(serde_json::Error),

    #[error("invalid CloudEvent: {0}")]
    Codec(#[from] cloudevents::message::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to encode reply event: {0}")]
    Encode(String),
}

impl WebhookError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::MissingEventId => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error was caused by the client rather than a fault.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        Reply::from_error(&self).into_response()
    }
}
