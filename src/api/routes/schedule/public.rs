//! Public types for the scheduling API
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Deserialize)]
pub struct ScheduleRequest {
    pub prompt: String,
}

#[derive(Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub message: String,
    pub event_link: Option<String>,
    // Fields as extracted by the model, before validation defaults
    pub meeting_details: Map<String, Value>,
}
