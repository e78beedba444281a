//! Router for the scheduling API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, extract::rejection::JsonRejection, response::Json};
use chrono::Local;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::SchedulerError;
use crate::meeting::schedule_meeting;

type SharedState = Arc<RwLock<AppState>>;

async fn schedule_handler(
    State(state): State<SharedState>,
    payload: Result<Json<public::ScheduleRequest>, JsonRejection>,
) -> Result<Json<public::ScheduleResponse>, ApiError> {
    let Json(payload) =
        payload.map_err(|e| SchedulerError::InvalidInput(e.body_text()))?;

    let (extractor, materializer) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.extractor.clone(),
            shared_state.materializer.clone(),
        )
    };

    let now = Local::now().fixed_offset();
    let scheduled = schedule_meeting(&extractor, &materializer, &payload.prompt, &now).await?;

    Ok(Json(public::ScheduleResponse {
        message: String::from("Meeting scheduled successfully"),
        event_link: scheduled.event.html_link,
        meeting_details: scheduled.raw,
    }))
}

/// Create the scheduling router
pub fn router() -> Router<SharedState> {
    Router::new().route("/schedule-meeting", axum::routing::post(schedule_handler))
}
