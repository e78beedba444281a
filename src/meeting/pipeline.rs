use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use super::materialize::EventMaterializer;
use super::schema::{ExtractedMeeting, validate};
use crate::ai::{Extractor, format_timestamp};
use crate::core::error::Result;
use crate::google::gcal::CreatedEvent;

#[derive(Debug)]
pub struct ScheduledMeeting {
    /// Fields exactly as the model returned them
    pub raw: Map<String, Value>,
    pub meeting: ExtractedMeeting,
    pub event: CreatedEvent,
}

/// Extract, validate and materialize in order. `now` is what relative
/// dates in `prompt` are resolved against.
pub async fn schedule_meeting(
    extractor: &Extractor,
    materializer: &EventMaterializer,
    prompt: &str,
    now: &DateTime<FixedOffset>,
) -> Result<ScheduledMeeting> {
    let raw = extractor.extract(prompt, &format_timestamp(now)).await?;
    let meeting = validate(&raw)?;
    tracing::debug!("Meeting details: {:?}", meeting);
    let event = materializer.materialize(&meeting).await?;
    Ok(ScheduledMeeting {
        raw,
        meeting,
        event,
    })
}
