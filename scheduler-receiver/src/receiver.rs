//! The webhook receiver core.
//!
//! `Receiver::handle` maps request headers and body to a `Reply`, independent
//! of any HTTP framework:
//!
//! 1. Decode the CloudEvent (id checked first)
//! 2. Decode the typed payload through the registry
//! 3. Log the execution
//! 4. Acknowledge, or echo back a new CloudEvent

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use cloudevents::{AttributesReader, Event};
use tracing::{debug, error, info, warn};

use crate::cloudevent::{acknowledgement, decode_request, Encoding, IncomingEvent};
use crate::config::{Config, ReplyMode};
use crate::data::{EventDataRegistry, TypedEventData};
use crate::error::WebhookError;

/// Outcome of handling one delivery.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with no body
    Ack,
    /// 200 carrying a CloudEvent in binary mode
    Event(Event),
    /// Plain-text error
    Error { status: StatusCode, message: String },
}

impl Reply {
    pub fn from_error(err: &WebhookError) -> Self {
        Reply::Error {
            status: err.status(),
            message: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Ack | Reply::Event(_) => StatusCode::OK,
            Reply::Error { status, .. } => *status,
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Ack => StatusCode::OK.into_response(),
            Reply::Event(event) => event.into_response(),
            Reply::Error { status, message } => (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                message,
            )
                .into_response(),
        }
    }
}

/// Stateless handler for scheduler webhook deliveries.
#[derive(Debug, Clone)]
pub struct Receiver {
    registry: EventDataRegistry,
    reply_mode: ReplyMode,
    log_payload: bool,
}

impl Receiver {
    pub fn new(registry: EventDataRegistry, reply_mode: ReplyMode) -> Self {
        Self {
            registry,
            reply_mode,
            log_payload: true,
        }
    }

    /// Build a receiver with the default decoders and the configured reply mode.
    pub fn from_config(config: &Config) -> Self {
        let registry = EventDataRegistry::with_defaults(config.default_event_type.clone());
        Self::new(registry, config.reply_mode).with_log_payload(config.log_payload)
    }

    pub fn with_log_payload(mut self, log_payload: bool) -> Self {
        self.log_payload = log_payload;
        self
    }

    pub fn reply_mode(&self) -> ReplyMode {
        self.reply_mode
    }

    /// Handle one delivery. Errors are turned into their HTTP reply.
    pub fn handle(&self, headers: &HeaderMap, body: &[u8]) -> Reply {
        match self.process(headers, body) {
            Ok(reply) => reply,
            Err(e) => {
                if e.is_client_error() {
                    warn!(error = %e, "event_rejected");
                } else {
                    error!(error = %e, "event_handling_failed");
                }
                Reply::from_error(&e)
            }
        }
    }

    /// Handle one delivery, surfacing errors to the caller.
    pub fn process(&self, headers: &HeaderMap, body: &[u8]) -> Result<Reply, WebhookError> {
        debug!(
            encoding = ?Encoding::detect(headers),
            body_length = body.len(),
            "event_received"
        );

        let event = decode_request(headers, body)?;
        let data = self.registry.decode(&event)?;

        self.log_execution(&event, &data);

        match self.reply_mode {
            ReplyMode::Ack => Ok(Reply::Ack),
            ReplyMode::Echo => {
                let reply = acknowledgement()?;

                debug!(
                    event_id = %event.id,
                    reply_id = %reply.id(),
                    reply_type = %reply.ty(),
                    "reply_event_built"
                );

                Ok(Reply::Event(reply))
            }
        }
    }

    fn log_execution(&self, event: &IncomingEvent, data: &TypedEventData) {
        let time = event.time_display();

        match data {
            TypedEventData::SchedulerJob(job) => {
                let custom_data = self.log_payload.then(|| job.custom_data_base64());

                info!(
                    event_id = %event.id,
                    event_time = %time,
                    event_type = event.ty.as_deref(),
                    event_source = event.source.as_deref(),
                    custom_data = custom_data.as_deref(),
                    summary = %format!(
                        "Cloud Scheduler executed a job (id: {}) at {}",
                        event.id, time
                    ),
                    "scheduler_job_executed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, HeaderValue};
    use cloudevents::Data;
    use serde_json::json;

    use super::*;
    use crate::error::MISSING_EVENT_ID_MESSAGE;
    use crate::testing::capture_logs;

    const JOB_BODY: &[u8] = br#"{"customData":"aGVsbG8="}"#;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    fn receiver(mode: ReplyMode) -> Receiver {
        Receiver::new(EventDataRegistry::default(), mode)
    }

    fn error_message(reply: &Reply) -> &str {
        match reply {
            Reply::Error { message, .. } => message,
            other => panic!("Expected error reply, got {:?}", other),
        }
    }

    #[test]
    fn test_ack_valid_event() {
        let map = headers(&[("ce-id", "abc123"), ("ce-time", "2020-01-01T00:00:00Z")]);
        let reply = receiver(ReplyMode::Ack).handle(&map, JOB_BODY);

        assert!(matches!(reply, Reply::Ack));
        assert_eq!(reply.status(), StatusCode::OK);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        for mode in [ReplyMode::Ack, ReplyMode::Echo] {
            let map = headers(&[("ce-time", "2020-01-01T00:00:00Z")]);
            let reply = receiver(mode).handle(&map, JOB_BODY);
            assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
            assert_eq!(error_message(&reply), MISSING_EVENT_ID_MESSAGE);
        }
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let reply = receiver(ReplyMode::Ack).handle(&headers(&[("ce-id", "")]), JOB_BODY);
        assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&reply), "Bad Request: expected header ce-id");
    }

    #[test]
    fn test_echo_reply() {
        let map = headers(&[
            ("ce-id", "abc123"),
            ("ce-type", "google.cloud.scheduler.job.v1.executed"),
            ("content-type", "application/json"),
        ]);
        let reply = receiver(ReplyMode::Echo).handle(&map, JOB_BODY);
        assert_eq!(reply.status(), StatusCode::OK);

        let Reply::Event(event) = reply else {
            panic!("Expected event reply");
        };
        assert_eq!(event.ty(), "com.example.kuberun.events.received");
        assert_eq!(event.source().to_string(), "https://localhost");
        assert_eq!(event.specversion().to_string(), "1.0");
        assert_ne!(event.id(), "abc123");
        assert_eq!(
            event.data(),
            Some(&Data::Json(json!({ "message": "Event received" })))
        );
    }

    #[test]
    fn test_echo_reply_ids_differ_per_request() {
        let map = headers(&[("ce-id", "abc123")]);
        let r = receiver(ReplyMode::Echo);

        let ids: Vec<String> = (0..2)
            .map(|_| match r.handle(&map, JOB_BODY) {
                Reply::Event(event) => event.id().to_string(),
                other => panic!("Expected event reply, got {:?}", other),
            })
            .collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_structured_event() {
        let body = json!({
            "specversion": "1.0",
            "id": "structured-1",
            "type": "google.cloud.scheduler.job.v1.executed",
            "source": "//cloudscheduler.googleapis.com/jobs/j",
            "data": { "customData": "aGk=" }
        });
        let map = headers(&[("content-type", "application/cloudevents+json")]);
        let reply = receiver(ReplyMode::Ack).handle(&map, body.to_string().as_bytes());
        assert_eq!(reply.status(), StatusCode::OK);
    }

    #[test]
    fn test_faults_are_internal_errors() {
        let r = receiver(ReplyMode::Ack);

        let unknown_type = headers(&[("ce-id", "1"), ("ce-type", "com.example.other")]);
        assert_eq!(
            r.handle(&unknown_type, JOB_BODY).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let bad_payload = headers(&[("ce-id", "1")]);
        assert_eq!(
            r.handle(&bad_payload, b"nope").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let no_data = headers(&[("ce-id", "1")]);
        assert_eq!(r.handle(&no_data, b"").status(), StatusCode::INTERNAL_SERVER_ERROR);

        let structured = headers(&[("content-type", "application/cloudevents+json")]);
        assert_eq!(
            r.handle(&structured, b"{").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_process_surfaces_errors() {
        let result = receiver(ReplyMode::Ack).process(&HeaderMap::new(), JOB_BODY);
        assert!(matches!(result, Err(WebhookError::MissingEventId)));
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            reply_mode: ReplyMode::Echo,
            ..Config::default()
        };
        assert_eq!(Receiver::from_config(&config).reply_mode(), ReplyMode::Echo);
    }

    #[test]
    fn test_execution_is_logged() {
        let (subscriber, buf) = capture_logs();

        let map = headers(&[("ce-id", "test-id"), ("ce-time", "2020-01-01T00:00:00Z")]);
        tracing::subscriber::with_default(subscriber, || {
            receiver(ReplyMode::Ack).handle(&map, JOB_BODY);
        });

        let output = buf.contents();
        assert!(output.contains("scheduler_job_executed"));
        assert!(output.contains("Cloud Scheduler executed a job (id: test-id) at 2020-01-01T00:00:00Z"));
        assert!(output.contains("aGVsbG8="));
    }

    #[test]
    fn test_payload_logging_can_be_disabled() {
        let (subscriber, buf) = capture_logs();

        let map = headers(&[("ce-id", "test-id")]);
        tracing::subscriber::with_default(subscriber, || {
            receiver(ReplyMode::Ack)
                .with_log_payload(false)
                .handle(&map, JOB_BODY);
        });

        let output = buf.contents();
        assert!(output.contains("(id: test-id) at unknown"));
        assert!(!output.contains("aGVsbG8="));
    }

    #[test]
    fn test_one_info_line_per_delivery() {
        for mode in [ReplyMode::Ack, ReplyMode::Echo] {
            let (subscriber, buf) = capture_logs();

            let map = headers(&[("ce-id", "abc123")]);
            tracing::subscriber::with_default(subscriber, || {
                receiver(mode).handle(&map, JOB_BODY);
            });

            assert_eq!(buf.info_lines(), 1, "mode {}: {}", mode, buf.contents());
        }
    }
}
