//! Reusable prompts using Handlebars for templating. Strict mode is on
//! so a missing variable is an error instead of an empty string.
//! Escaping is off because the output goes to a model, not a browser.

use std::fmt;

use handlebars::Handlebars;

#[derive(Debug)]
pub enum Prompt {
    MeetingExtraction,
    ScheduleRequest,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Prompt> for String {
    fn from(item: Prompt) -> String {
        format!("{:?}", item)
    }
}

const MEETING_EXTRACTION_PROMPT: &str = r#"You are a precise meeting scheduling parser.
Extract ONLY a compact JSON with keys:
{
  "title": "string",
  "participants": ["email1@example.com", "..."],
  "start_time": "ISO8601 with timezone, e.g. 2025-08-16T10:00:00+05:30",
  "duration_minutes": number,
  "agenda": "string"
}
- If duration is missing, default 30.
- If timezone words like IST/ET appear, resolve to proper offset.
- Participants should be emails if present; if only names appear, omit them.
Return ONLY JSON, no prose.
"#;

const SCHEDULE_REQUEST_PROMPT: &str = "Today's date is {{today}}. {{prompt}}";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    registry
        .register_template_string(
            &Prompt::MeetingExtraction.to_string(),
            MEETING_EXTRACTION_PROMPT,
        )
        .expect("Failed to register template");
    registry
        .register_template_string(
            &Prompt::ScheduleRequest.to_string(),
            SCHEDULE_REQUEST_PROMPT,
        )
        .expect("Failed to register template");
    registry
}
