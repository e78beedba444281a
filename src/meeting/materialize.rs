use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};

use super::schema::{ExtractedMeeting, MeetingTime, validate};
use crate::core::AppConfig;
use crate::core::error::{Result, SchedulerError};
use crate::google::CredentialManager;
use crate::google::gcal::{Attendee, CalendarEventRequest, CreatedEvent, EventDateTime, insert_event};
use crate::google::gmail::send_message;

/// Zone declared for timestamps that carry no UTC offset. Fixed on
/// purpose, existing calendars depend on it.
pub const FALLBACK_TIME_ZONE: &str = "Asia/Kolkata";

fn event_time(time: MeetingTime) -> EventDateTime {
    EventDateTime {
        date_time: time.to_iso(),
        time_zone: if time.has_offset() {
            None
        } else {
            Some(FALLBACK_TIME_ZONE.to_string())
        },
    }
}

/// Build the `events.insert` body for a validated meeting.
pub fn build_event(meeting: &ExtractedMeeting) -> CalendarEventRequest {
    let summary = if meeting.title().is_empty() {
        "Meeting".to_string()
    } else {
        meeting.title().to_string()
    };
    CalendarEventRequest {
        summary,
        description: meeting.agenda().to_string(),
        start: event_time(meeting.start()),
        end: event_time(meeting.end()),
        attendees: meeting
            .participants()
            .iter()
            .map(|email| Attendee {
                email: email.clone(),
            })
            .collect(),
    }
}

/// Subject and body of the invitation sent to each participant
pub fn invitation(meeting: &ExtractedMeeting, event: &CreatedEvent) -> (String, String) {
    let subject = format!("Invitation: {}", meeting.title());
    let body = format!(
        "You have been invited to '{}'\nAgenda: {}\nStart: {}\nEnd: {}\nEvent Link: {}",
        meeting.title(),
        meeting.agenda(),
        meeting.start(),
        meeting.end(),
        event.html_link.as_deref().unwrap_or("unavailable"),
    );
    (subject, body)
}

/// Turns validated meetings into calendar events and sends the
/// invitation emails.
#[derive(Clone, Debug)]
pub struct EventMaterializer {
    client: Client,
    credentials: Arc<CredentialManager>,
    calendar_api_base_url: String,
    gmail_api_base_url: String,
    calendar_id: String,
    timeout: Duration,
}

impl EventMaterializer {
    pub fn new(config: &AppConfig, credentials: Arc<CredentialManager>) -> Self {
        Self {
            client: Client::new(),
            credentials,
            calendar_api_base_url: config.calendar_api_base_url.clone(),
            gmail_api_base_url: config.gmail_api_base_url.clone(),
            calendar_id: config.calendar_id.clone(),
            timeout: Duration::from_secs(config.google_api_timeout_secs),
        }
    }

    /// Entry point for callers holding raw extracted fields. The start
    /// time is checked before anything else so a missing one never
    /// reaches the network. The rest goes through [`validate`], so a
    /// missing `duration_minutes` is a `SchemaViolation` here as well
    /// rather than silently becoming 30 minutes.
    pub async fn materialize_fields(&self, raw: &Map<String, Value>) -> Result<CreatedEvent> {
        let has_start = match raw.get("start_time") {
            Some(Value::String(s)) => !s.trim().is_empty(),
            None | Some(Value::Null) => false,
            Some(_) => true,
        };
        if !has_start {
            return Err(SchedulerError::InvalidInput(
                "start_time is required".to_string(),
            ));
        }
        let meeting = validate(raw)?;
        self.materialize(&meeting).await
    }

    pub async fn materialize(&self, meeting: &ExtractedMeeting) -> Result<CreatedEvent> {
        let event = build_event(meeting);
        tracing::debug!(
            "Event payload: {}",
            serde_json::to_string(&event).unwrap_or_default()
        );

        let credential = self.credentials.get_valid_credential().await?;

        let created = insert_event(
            &self.client,
            &self.calendar_api_base_url,
            &credential.access_token,
            &self.calendar_id,
            &event,
            self.timeout,
        )
        .await?;
        tracing::info!(
            "Created event {} ({})",
            created.id,
            created.html_link.as_deref().unwrap_or("no link")
        );

        self.send_invitations(&credential.access_token, meeting, &created)
            .await;

        Ok(created)
    }

    /// Best effort. The event already exists so one bad recipient
    /// shouldn't stop the others from hearing about it.
    async fn send_invitations(
        &self,
        access_token: &str,
        meeting: &ExtractedMeeting,
        created: &CreatedEvent,
    ) {
        let (subject, body) = invitation(meeting, created);
        for email in meeting.participants() {
            match send_message(
                &self.client,
                &self.gmail_api_base_url,
                access_token,
                email,
                &subject,
                &body,
                self.timeout,
            )
            .await
            {
                Ok(sent) => tracing::debug!("Sent invitation to {} ({})", email, sent.id),
                Err(e) => tracing::warn!("Failed to send invitation to {}: {}", email, e),
            }
        }
    }
}
