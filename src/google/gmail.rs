//! Gmail API client for sending plain text invitations

use std::time::Duration;

use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD, URL_SAFE},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::error::{Result, SchedulerError, upstream_error};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageResponse {
    pub id: String,
    #[serde(rename = "threadId")]
    pub thread_id: String,
}

/// Send a plain text email from the authenticated user
pub async fn send_message(
    client: &Client,
    api_base_url: &str,
    access_token: &str,
    to: &str,
    subject: &str,
    body: &str,
    timeout: Duration,
) -> Result<MessageResponse> {
    let url = format!(
        "{}/gmail/v1/users/me/messages/send",
        api_base_url.trim_end_matches('/')
    );
    let raw = base64_url(&build_raw_message(to, subject, body));
    let res = client
        .post(&url)
        .bearer_auth(access_token)
        .timeout(timeout)
        .json(&json!({ "raw": raw }))
        .send()
        .await
        .map_err(|e| upstream_error("Gmail send failed", e))?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(SchedulerError::UpstreamUnavailable(format!(
            "Gmail send failed: {} ({})",
            status, text
        )));
    }
    serde_json::from_str(&text).map_err(|e| upstream_error("Gmail send failed", e))
}

/// RFC 2822 message. Header values come from model output so line
/// breaks are flattened to keep them from injecting extra headers.
pub fn build_raw_message(to: &str, subject: &str, body: &str) -> String {
    format!(
        "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\nContent-Transfer-Encoding: 8bit\r\n\r\n{}",
        single_line(to),
        encode_header(&single_line(subject)),
        body
    )
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// RFC 2047 encoded-word for non-ASCII header values
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

/// Helper: base64url encode, which is what the Gmail API expects for `raw`
fn base64_url(input: &str) -> String {
    URL_SAFE.encode(input.as_bytes())
}
