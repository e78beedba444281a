//! Validation boundary between untrusted model output and the rest of
//! the scheduler. An `ExtractedMeeting` can only be built by
//! [`validate`].

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::error::{Result, SchedulerError};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("Invalid email regex")
});

const ZONED_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

const FLOATING_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn is_valid_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

/// A point in time as the model wrote it: either with an explicit UTC
/// offset or as wall-clock time with no zone at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeetingTime {
    Zoned(DateTime<FixedOffset>),
    Floating(NaiveDateTime),
}

impl MeetingTime {
    /// Parse the ISO8601 shapes models produce: date only, date and
    /// time with or without seconds, `T` or space separated, optionally
    /// followed by `Z` or a numeric offset.
    pub fn parse(input: &str) -> Option<Self> {
        let mut s = input.trim().to_string();
        if s.len() > 10 && s.as_bytes()[10] == b' ' {
            s.replace_range(10..11, "T");
        }
        if s.ends_with('Z') || s.ends_with('z') {
            s.pop();
            s.push_str("+00:00");
        }

        for fmt in ZONED_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(&s, fmt) {
                return Some(MeetingTime::Zoned(dt));
            }
        }
        for fmt in FLOATING_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&s, fmt) {
                return Some(MeetingTime::Floating(dt));
            }
        }
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(MeetingTime::Floating)
    }

    pub fn has_offset(&self) -> bool {
        matches!(self, MeetingTime::Zoned(_))
    }

    /// `None` when the result falls outside the calendar range chrono
    /// can represent.
    pub fn add_minutes(&self, minutes: i64) -> Option<Self> {
        let delta = Duration::try_minutes(minutes)?;
        match self {
            MeetingTime::Zoned(dt) => dt.checked_add_signed(delta).map(MeetingTime::Zoned),
            MeetingTime::Floating(dt) => dt.checked_add_signed(delta).map(MeetingTime::Floating),
        }
    }

    /// ISO8601 with `T` separator, e.g. `2025-01-01T09:15:00` or
    /// `2025-08-16T10:00:00+05:30`.
    pub fn to_iso(&self) -> String {
        match self {
            MeetingTime::Zoned(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string(),
            MeetingTime::Floating(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

/// Space separated form used in invitation emails.
impl fmt::Display for MeetingTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MeetingTime::Zoned(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f%:z")),
            MeetingTime::Floating(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExtractedMeeting {
    title: String,
    participants: Vec<String>,
    start_time: String,
    #[serde(skip)]
    start: MeetingTime,
    #[serde(skip)]
    end: MeetingTime,
    duration_minutes: i64,
    agenda: String,
}

impl ExtractedMeeting {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// The start time exactly as extracted.
    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    pub fn start(&self) -> MeetingTime {
        self.start
    }

    pub fn end(&self) -> MeetingTime {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }

    pub fn agenda(&self) -> &str {
        &self.agenda
    }
}

/// Check raw extracted fields and build an `ExtractedMeeting`.
pub fn validate(raw: &Map<String, Value>) -> Result<ExtractedMeeting> {
    let start_time = match raw.get("start_time") {
        None | Some(Value::Null) => return Err(violation("start_time is required")),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(violation(&format!(
                "start_time must be an ISO8601 string, got {}",
                other
            )));
        }
    };
    let start = MeetingTime::parse(&start_time)
        .ok_or_else(|| violation(&format!("Invalid ISO datetime: {}", start_time)))?;

    let duration_minutes = match raw.get("duration_minutes") {
        None | Some(Value::Null) => return Err(violation("duration_minutes is required")),
        Some(value) => coerce_minutes(value)?,
    };
    let end = start.add_minutes(duration_minutes).ok_or_else(|| {
        violation(&format!(
            "duration_minutes {} puts the end time out of range",
            duration_minutes
        ))
    })?;

    let participants = match raw.get("participants") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(email) if is_valid_email(email.trim()) => {
                    Ok(email.trim().to_string())
                }
                other => Err(violation(&format!("Invalid participant email: {}", other))),
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(violation(&format!(
                "participants must be a list of email addresses, got {}",
                other
            )));
        }
    };

    Ok(ExtractedMeeting {
        title: optional_string(raw, "title")?,
        participants,
        start_time,
        start,
        end,
        duration_minutes,
        agenda: optional_string(raw, "agenda")?,
    })
}

fn coerce_minutes(value: &Value) -> Result<i64> {
    let minutes = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
    .ok_or_else(|| {
        violation(&format!(
            "duration_minutes must be an integer, got {}",
            value
        ))
    })?;

    if minutes < 0 {
        return Err(violation(&format!(
            "duration_minutes must not be negative, got {}",
            minutes
        )));
    }
    Ok(minutes)
}

fn optional_string(raw: &Map<String, Value>, key: &str) -> Result<String> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(violation(&format!("{} must be a string, got {}", key, other))),
    }
}

fn violation(msg: &str) -> SchedulerError {
    SchedulerError::SchemaViolation(msg.to_string())
}
