use anyhow::Result;
use chrono::Local;
use serde_json::{Value, json};

use crate::ai::{Extractor, format_timestamp};
use crate::core::AppConfig;
use crate::meeting::{build_event, validate};

/// Dry run of the pipeline up to the calendar call. Prints the raw
/// extraction, the validated meeting and the event that would be
/// inserted.
pub async fn run(prompt: &str, config: AppConfig) -> Result<()> {
    let extractor = Extractor::new(&config.ollama_base_url, &config.ollama_model);
    let now = Local::now().fixed_offset();
    let raw = extractor.extract(prompt, &format_timestamp(&now)).await?;
    let meeting = validate(&raw)?;
    let event = build_event(&meeting);

    let out = json!({
        "extracted": Value::Object(raw),
        "meeting": meeting,
        "event": event,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
