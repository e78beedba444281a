use thiserror::Error;

pub type Result<T, E = SchedulerError> = std::result::Result<T, E>;

/// Every failure the scheduling pipeline can produce. Each variant maps
/// to one stage of the pipeline so callers can tell "the model
/// hallucinated" apart from "the calendar is down".
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Transport failure, timeout or non-2xx from the inference server
    /// or the calendar/mail provider.
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// The model reply could not be coerced into a JSON object.
    #[error("{0}")]
    MalformedExtraction(String),

    /// The JSON object is missing required fields or has bad values.
    #[error("{0}")]
    SchemaViolation(String),

    /// A precondition failed before any external call was made.
    #[error("{0}")]
    InvalidInput(String),

    /// Loading, refreshing or obtaining OAuth credentials failed.
    #[error("{0}")]
    CredentialError(String),
}

impl SchedulerError {
    /// Stable identifier for the failure kind, used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            SchedulerError::UpstreamUnavailable(_) => "upstream_unavailable",
            SchedulerError::MalformedExtraction(_) => "malformed_extraction",
            SchedulerError::SchemaViolation(_) => "schema_violation",
            SchedulerError::InvalidInput(_) => "invalid_input",
            SchedulerError::CredentialError(_) => "credential_error",
        }
    }
}

pub fn upstream_error(context: &str, err: impl std::fmt::Display) -> SchedulerError {
    SchedulerError::UpstreamUnavailable(format!("{}: {}", context, err))
}

pub fn credential_error(context: &str, err: impl std::fmt::Display) -> SchedulerError {
    SchedulerError::CredentialError(format!("{}: {}", context, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_renders_only_the_message() {
        let err = SchedulerError::SchemaViolation("start_time is required".to_string());
        assert_eq!(err.to_string(), "start_time is required");
        assert_eq!(err.kind(), "schema_violation");
    }

    #[test]
    fn it_prefixes_context_for_upstream_errors() {
        let err = upstream_error("Ollama request failed", "connection refused");
        assert_eq!(err.to_string(), "Ollama request failed: connection refused");
        assert_eq!(err.kind(), "upstream_unavailable");
    }
}
