//! Validated meetings and how they become calendar events

pub mod materialize;
pub mod pipeline;
pub mod schema;

pub use materialize::{EventMaterializer, FALLBACK_TIME_ZONE, build_event};
pub use pipeline::{ScheduledMeeting, schedule_meeting};
pub use schema::{ExtractedMeeting, MeetingTime, validate};
