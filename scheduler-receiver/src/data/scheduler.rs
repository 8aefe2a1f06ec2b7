//! Cloud Scheduler job payload.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE},
    Engine as _,
};
use serde::{Deserialize, Deserializer};

use crate::cloudevent::EventData;
use crate::data::TypedEventData;
use crate::error::DecodeError;

/// Event type emitted by Eventarc for a Cloud Scheduler job execution.
pub const SCHEDULER_JOB_EXECUTED: &str = "google.cloud.scheduler.job.v1.executed";

/// Event type emitted by the Knative Cloud Scheduler source.
pub const SCHEDULER_JOB_EXECUTE_LEGACY: &str = "com.google.cloud.scheduler.job.execute";

/// Data carried by a scheduler job execution event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerJobData {
    /// Opaque payload configured on the job
    #[serde(default, deserialize_with = "deserialize_bytes")]
    pub custom_data: Vec<u8>,
}

impl SchedulerJobData {
    /// `customData` re-encoded as standard base64, for logging.
    pub fn custom_data_base64(&self) -> String {
        STANDARD.encode(&self.custom_data)
    }
}

/// Decoder registered for the scheduler event types.
pub fn decode_scheduler_job(
    data: Option<&EventData>,
    content_type: Option<&str>,
) -> Result<TypedEventData, DecodeError> {
    let data = data.ok_or(DecodeError::MissingData)?;

    if let Some(content_type) = content_type {
        if !is_json(content_type) {
            return Err(DecodeError::UnsupportedContentType(content_type.to_string()));
        }
    }

    let job: SchedulerJobData = match data {
        EventData::Binary(bytes) => serde_json::from_slice(bytes)?,
        EventData::Json(value) => SchedulerJobData::deserialize(value)?,
    };

    Ok(TypedEventData::SchedulerJob(job))
}

fn is_json(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json" || media_type == "text/json" || media_type.ends_with("+json")
}

/// Proto3 JSON `bytes`: base64, either alphabet, padding optional.
fn deserialize_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let padded = match encoded.len() % 4 {
        2 => format!("{}==", encoded),
        3 => format!("{}=", encoded),
        _ => encoded,
    };

    STANDARD
        .decode(padded.as_bytes())
        .or_else(|_| URL_SAFE.decode(padded.as_bytes()))
        .map_err(|_| serde::de::Error::custom("customData is not valid base64"))
}
