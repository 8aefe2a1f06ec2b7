//! Typed event-data registry.
//!
//! Maps a CloudEvents `type` to the decoder that turns the event's `data`
//! into a concrete payload.
//!
//! ```text
//! IncomingEvent → EventDataRegistry::decode() → TypedEventData
//! ```

pub mod scheduler;

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::cloudevent::{EventData, IncomingEvent};
use crate::error::DecodeError;

pub use scheduler::{
    decode_scheduler_job, SchedulerJobData, SCHEDULER_JOB_EXECUTED, SCHEDULER_JOB_EXECUTE_LEGACY,
};

/// A decoded event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedEventData {
    SchedulerJob(SchedulerJobData),
}

/// Decoder for one event type: `(data, datacontenttype) -> payload`.
pub type DataDecoder = fn(Option<&EventData>, Option<&str>) -> Result<TypedEventData, DecodeError>;

/// Registry of data decoders keyed by event type.
#[derive(Clone)]
pub struct EventDataRegistry {
    decoders: HashMap<String, DataDecoder>,
    default_type: String,
}

impl EventDataRegistry {
    /// Create an empty registry.
    ///
    /// `default_type` is used for events that carry no `type` attribute.
    pub fn new(default_type: impl Into<String>) -> Self {
        Self {
            decoders: HashMap::new(),
            default_type: default_type.into(),
        }
    }

    /// Create a registry with the scheduler decoders registered.
    pub fn with_defaults(default_type: impl Into<String>) -> Self {
        let mut registry = Self::new(default_type);
        registry.register(SCHEDULER_JOB_EXECUTED, decode_scheduler_job);
        registry.register(SCHEDULER_JOB_EXECUTE_LEGACY, decode_scheduler_job);
        registry
    }

    /// Register `decoder` for `event_type`, replacing any previous one.
    pub fn register(&mut self, event_type: impl Into<String>, decoder: DataDecoder) {
        self.decoders.insert(event_type.into(), decoder);
    }

    pub fn default_type(&self) -> &str {
        &self.default_type
    }

    /// Decode the event's data with the decoder registered for its type.
    pub fn decode(&self, event: &IncomingEvent) -> Result<TypedEventData, DecodeError> {
        let event_type = event.ty.as_deref().unwrap_or(&self.default_type);

        let decoder = self
            .decoders
            .get(event_type)
            .ok_or_else(|| DecodeError::UnknownType(event_type.to_string()))?;

        debug!(event_id = %event.id, event_type = %event_type, "event_data_decoding");

        decoder(event.data.as_ref(), event.content_type.as_deref())
    }
}

impl fmt::Debug for EventDataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.decoders.keys().collect();
        types.sort();
        f.debug_struct("EventDataRegistry")
            .field("types", &types)
            .field("default_type", &self.default_type)
            .finish()
    }
}

impl Default for EventDataRegistry {
    fn default() -> Self {
        Self::with_defaults(SCHEDULER_JOB_EXECUTED)
    }
}
