//! Scheduler Receiver - CloudEvents webhook receiver for Cloud Scheduler.
//!
//! This library provides the pieces behind the `scheduler-receiver` binary:
//! - `cloudevent`: CloudEvents v1.0 HTTP binding (binary and structured mode)
//! - `data`: Registry mapping event types to typed payload decoders
//! - `receiver`: Framework-independent request handler
//! - `web`: axum routes wrapping the receiver
//!
//! ## Architecture
//!
//! ```text
//! Cloud Scheduler → POST / → Receiver → log → 200 (ack or echoed CloudEvent)
//! ```

pub mod cloudevent;
pub mod config;
pub mod data;
pub mod error;
pub mod receiver;
pub mod web;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use cloudevent::{EventData, IncomingEvent};
pub use config::{Config, ReplyMode};
pub use data::{EventDataRegistry, SchedulerJobData, TypedEventData};
pub use error::{DecodeError, WebhookError};
pub use receiver::{Receiver, Reply};
pub use web::AppState;
