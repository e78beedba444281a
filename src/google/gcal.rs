//! Google Calendar event insertion

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{Result, SchedulerError, upstream_error};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
}

/// Body of an `events.insert` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEventRequest {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
}

/// The provider's representation of the inserted event. Only the
/// fields the scheduler reads are typed, everything else is kept as is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Insert `event` into `calendar_id` and ask Google to notify every
/// attendee.
pub async fn insert_event(
    client: &Client,
    api_base_url: &str,
    access_token: &str,
    calendar_id: &str,
    event: &CalendarEventRequest,
    timeout: Duration,
) -> Result<CreatedEvent> {
    let url = format!(
        "{}/calendar/v3/calendars/{}/events?sendUpdates=all",
        api_base_url.trim_end_matches('/'),
        urlencoding::encode(calendar_id)
    );
    let res = client
        .post(&url)
        .bearer_auth(access_token)
        .timeout(timeout)
        .json(event)
        .send()
        .await
        .map_err(|e| upstream_error("Google Calendar API error", e))?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(SchedulerError::UpstreamUnavailable(format!(
            "Google Calendar API error: {} ({})",
            status, text
        )));
    }
    serde_json::from_str(&text).map_err(|e| upstream_error("Google Calendar API error", e))
}
