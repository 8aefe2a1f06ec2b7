//! CloudEvents v1.0 HTTP protocol binding.
//!
//! Full binary-mode and structured-mode requests are decoded by the
//! CloudEvents SDK. Binary deliveries that only carry `ce-id` (and maybe
//! `ce-time`) are read leniently, since the SDK requires `ce-specversion`,
//! `ce-type` and `ce-source`.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use cloudevents::binding::http::to_event;
use cloudevents::AttributesReader;

use crate::cloudevent::event::{EventData, IncomingEvent, SPEC_VERSION};
use crate::error::WebhookError;

pub const CE_ID_HEADER: &str = "ce-id";
pub const CE_TYPE_HEADER: &str = "ce-type";
pub const CE_SOURCE_HEADER: &str = "ce-source";
pub const CE_SPECVERSION_HEADER: &str = "ce-specversion";
pub const CE_TIME_HEADER: &str = "ce-time";

pub const CE_JSON_CONTENT_TYPE: &str = "application/cloudevents+json";

/// How an event is laid out in an HTTP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Binary,
    Structured,
}

impl Encoding {
    /// Detect the encoding from the request's `Content-Type`.
    pub fn detect(headers: &HeaderMap) -> Self {
        let media_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::trim);

        match media_type {
            Some(mt) if mt.eq_ignore_ascii_case(CE_JSON_CONTENT_TYPE) => Encoding::Structured,
            _ => Encoding::Binary,
        }
    }
}

/// Decode an HTTP request into an event, whichever mode it uses.
///
/// The event id is checked before anything else is decoded.
pub fn decode_request(headers: &HeaderMap, body: &[u8]) -> Result<IncomingEvent, WebhookError> {
    match Encoding::detect(headers) {
        Encoding::Structured => {
            require_structured_id(body)?;
            decode_with_sdk(headers, body)
        }
        Encoding::Binary => {
            require_header_id(headers)?;
            let complete = [CE_SPECVERSION_HEADER, CE_TYPE_HEADER, CE_SOURCE_HEADER]
                .iter()
                .all(|name| headers.contains_key(*name));

            if complete {
                decode_with_sdk(headers, body)
            } else {
                decode_partial_binary(headers, body)
            }
        }
    }
}

fn require_header_id(headers: &HeaderMap) -> Result<(), WebhookError> {
    headers
        .get(CE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|_| ())
        .ok_or(WebhookError::MissingEventId)
}

fn require_structured_id(body: &[u8]) -> Result<(), WebhookError> {
    let doc: serde_json::Value =
        serde_json::from_slice(body).map_err(WebhookError::MalformedEvent)?;

    match doc.get("id").and_then(|v| v.as_str()) {
        Some(id) if !id.is_empty() => Ok(()),
        _ => Err(WebhookError::MissingEventId),
    }
}

fn decode_with_sdk(headers: &HeaderMap, body: &[u8]) -> Result<IncomingEvent, WebhookError> {
    let event = to_event(headers, body.to_vec())?;
    check_spec_version(&event.specversion().to_string())?;
    Ok(IncomingEvent::from(&event))
}

/// Binary request missing some required attributes.
fn decode_partial_binary(headers: &HeaderMap, body: &[u8]) -> Result<IncomingEvent, WebhookError> {
    let id = header_str(headers, CE_ID_HEADER)?.ok_or(WebhookError::MissingEventId)?;
    let mut event = IncomingEvent::new(id);

    if let Some(version) = header_str(headers, CE_SPECVERSION_HEADER)? {
        check_spec_version(version)?;
    }

    event.ty = header_str(headers, CE_TYPE_HEADER)?.map(str::to_string);
    event.source = header_str(headers, CE_SOURCE_HEADER)?.map(str::to_string);
    event.time = header_str(headers, CE_TIME_HEADER)?
        .map(parse_time)
        .transpose()?;
    event.content_type = header_str(headers, header::CONTENT_TYPE.as_str())?.map(str::to_string);

    if !body.is_empty() {
        event.data = Some(EventData::Binary(body.to_vec()));
    }

    Ok(event)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, WebhookError> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map_err(|_| WebhookError::InvalidHeader(name.to_string()))
        })
        .transpose()
}

fn check_spec_version(version: &str) -> Result<(), WebhookError> {
    if version == SPEC_VERSION {
        Ok(())
    } else {
        Err(WebhookError::UnsupportedSpecVersion(version.to_string()))
    }
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, WebhookError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| WebhookError::InvalidTime {
            value: value.to_string(),
            source,
        })
}
