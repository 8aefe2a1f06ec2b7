//! Event envelopes exchanged with the scheduler.
//!
//! - `IncomingEvent`: what a webhook delivery decodes into
//! - `acknowledgement()`: the CloudEvent sent back in echo mode

use chrono::{DateTime, SecondsFormat, Utc};
use cloudevents::{AttributesReader, Data, Event, EventBuilder, EventBuilderV10};
use serde_json::json;
use uuid::Uuid;

use crate::error::WebhookError;

/// The only CloudEvents version this receiver speaks.
pub const SPEC_VERSION: &str = "1.0";

/// Event type of the acknowledgement reply.
pub const REPLY_EVENT_TYPE: &str = "com.example.kuberun.events.received";

/// Source of the acknowledgement reply.
pub const REPLY_EVENT_SOURCE: &str = "https://localhost";

/// Payload of an event as it arrived on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// Raw bytes (binary-mode body or structured `data_base64`)
    Binary(Vec<u8>),
    /// Already-parsed JSON (structured `data`)
    Json(serde_json::Value),
}

impl EventData {
    /// Parse the payload as JSON regardless of how it arrived.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            EventData::Binary(bytes) => serde_json::from_slice(bytes),
            EventData::Json(value) => Ok(value.clone()),
        }
    }
}

impl From<&Data> for EventData {
    fn from(data: &Data) -> Self {
        match data {
            Data::Binary(bytes) => EventData::Binary(bytes.clone()),
            Data::String(s) => EventData::Binary(s.clone().into_bytes()),
            Data::Json(value) => EventData::Json(value.clone()),
        }
    }
}

/// A single scheduler delivery.
///
/// Only `id` and `specversion` are guaranteed; schedulers have been seen
/// sending nothing but `ce-id` and `ce-time`.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingEvent {
    /// Delivery identifier, never empty
    pub id: String,
    /// Always `1.0`
    pub specversion: String,
    /// Event type, used to select a data decoder
    pub ty: Option<String>,
    /// URI of the scheduler job that fired
    pub source: Option<String>,
    /// When the scheduler fired the job
    pub time: Option<DateTime<Utc>>,
    /// Media type of `data`
    pub content_type: Option<String>,
    pub data: Option<EventData>,
}

impl IncomingEvent {
    /// Create an event with only the required attributes set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            specversion: SPEC_VERSION.to_string(),
            ty: None,
            source: None,
            time: None,
            content_type: None,
            data: None,
        }
    }

    /// Firing time formatted for logs, `Z` suffix kept for UTC.
    pub fn time_display(&self) -> String {
        self.time
            .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl From<&Event> for IncomingEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id().to_string(),
            specversion: event.specversion().to_string(),
            ty: Some(event.ty().to_string()),
            source: Some(event.source().to_string()),
            time: event.time().copied(),
            content_type: event.datacontenttype().map(str::to_string),
            data: event.data().map(EventData::from),
        }
    }
}

/// Acknowledgement for a received scheduler event, with a fresh id.
pub fn acknowledgement() -> Result<Event, WebhookError> {
    EventBuilderV10::new()
        .id(Uuid::new_v4().to_string())
        .ty(REPLY_EVENT_TYPE)
        .source(REPLY_EVENT_SOURCE)
        .time(Utc::now())
        .data("application/json", json!({ "message": "Event received" }))
        .build()
        .map_err(|e| WebhookError::Encode(e.to_string()))
}
