use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::error::{Result, SchedulerError, upstream_error};

/// Upper bound on a single inference call.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

/// Low temperature keeps extraction output close to deterministic.
const TEMPERATURE: f64 = 0.1;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

// {
//   "model": "mistral",
//   "created_at": "2025-08-15T10:00:00.000Z",
//   "message": { "role": "assistant", "content": "{\"title\": ...}" },
//   "done": true
// }
#[derive(Deserialize, Debug)]
struct ChatResponse {
    message: Message,
}

/// Sends `messages` to `{api_hostname}/api/chat` and returns the
/// assistant's reply text.
pub async fn chat(
    client: &reqwest::Client,
    messages: &[Message],
    api_hostname: &str,
    model: &str,
) -> Result<String> {
    let payload = json!({
        "model": model,
        "messages": messages,
        "stream": false,
        "options": { "temperature": TEMPERATURE },
    });
    let url = format!("{}/api/chat", api_hostname.trim_end_matches('/'));

    let response = client
        .post(url)
        .header("Content-Type", "application/json")
        .timeout(CHAT_TIMEOUT)
        .json(&payload)
        .send()
        .await
        .and_then(|res| res.error_for_status())
        .map_err(|e| upstream_error("Ollama request failed", e))?;

    let body: Value = response
        .json()
        .await
        .map_err(|e| upstream_error("Ollama request failed", e))?;

    let resp: ChatResponse = serde_json::from_value(body.clone()).map_err(|_| {
        SchedulerError::MalformedExtraction(format!(
            "Error parsing Ollama response: missing message.content in {}",
            body
        ))
    })?;

    Ok(resp.message.content)
}
