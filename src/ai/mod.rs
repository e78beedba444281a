pub mod extract;
pub mod prompt;

pub use extract::{Extractor, format_timestamp, parse_reply};
