//! Turns a free-text scheduling request into the raw JSON fields the
//! model extracted. Nothing here is validated; see `meeting::schema`.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value, json};

use super::prompt::{Prompt, templates};
use crate::core::error::{Result, SchedulerError};
use crate::ollama::{Message, Role, chat};

#[derive(Clone, Debug)]
pub struct Extractor {
    client: reqwest::Client,
    api_hostname: String,
    model: String,
}

impl Extractor {
    pub fn new(api_hostname: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_hostname: api_hostname.to_string(),
            model: model.to_string(),
        }
    }

    /// Ask the model for the meeting fields in `prompt_text`.
    /// `current_timestamp` is prepended so relative dates like
    /// "tomorrow" can be resolved.
    pub async fn extract(
        &self,
        prompt_text: &str,
        current_timestamp: &str,
    ) -> Result<Map<String, Value>> {
        let registry = templates();
        let render_err = |e: handlebars::RenderError| {
            SchedulerError::InvalidInput(format!("Failed to render prompt: {}", e))
        };
        let system = registry
            .render(&Prompt::MeetingExtraction.to_string(), &json!({}))
            .map_err(render_err)?;
        let user = registry
            .render(
                &Prompt::ScheduleRequest.to_string(),
                &json!({"today": current_timestamp, "prompt": prompt_text}),
            )
            .map_err(render_err)?;
        tracing::debug!("Prompt with date: {}", user);

        let messages = vec![
            Message::new(Role::System, &system),
            Message::new(Role::User, &user),
        ];
        let reply = chat(&self.client, &messages, &self.api_hostname, &self.model).await?;
        tracing::debug!("Raw model reply: {}", reply);

        let parsed = parse_reply(&reply)?;
        tracing::debug!("Parsed extraction: {:?}", parsed);
        Ok(parsed)
    }
}

/// Parse a model reply into a JSON object. Models are chatty so when
/// the whole reply isn't JSON, fall back to the span between the first
/// `{` and the last `}`.
pub fn parse_reply(content: &str) -> Result<Map<String, Value>> {
    let content = content.trim();

    let value = match serde_json::from_str::<Value>(content) {
        Ok(value) => value,
        Err(_) => {
            let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) else {
                return Err(SchedulerError::MalformedExtraction(
                    "Error parsing Ollama response: No JSON found in model response".to_string(),
                ));
            };
            if end < start {
                return Err(SchedulerError::MalformedExtraction(
                    "Error parsing Ollama response: No JSON found in model response".to_string(),
                ));
            }
            serde_json::from_str::<Value>(&content[start..=end]).map_err(|e| {
                SchedulerError::MalformedExtraction(format!(
                    "Error parsing Ollama response: {}",
                    e
                ))
            })?
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(SchedulerError::MalformedExtraction(format!(
            "Error parsing Ollama response: expected a JSON object, got {}",
            other
        ))),
    }
}

/// Human readable "now" for the model, e.g. `Friday, 2025-08-15 09:00:00 +05:30`.
pub fn format_timestamp(now: &DateTime<FixedOffset>) -> String {
    now.format("%A, %Y-%m-%d %H:%M:%S %:z").to_string()
}
