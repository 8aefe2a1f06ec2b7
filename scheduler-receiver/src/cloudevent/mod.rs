//! CloudEvents envelopes and their HTTP binding.
//!
//! ## Wire Flow
//!
//! ```text
//! HTTP request → decode_request() → IncomingEvent
//! acknowledgement() → cloudevents::Event → binary-mode HTTP response
//! ```

pub mod binding;
pub mod event;

pub use binding::{decode_request, Encoding};
pub use event::{acknowledgement, EventData, IncomingEvent, SPEC_VERSION};
