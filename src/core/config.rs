use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub client_secrets_path: String,
    pub token_path: String,
    pub calendar_id: String,
    pub calendar_api_base_url: String,
    pub gmail_api_base_url: String,
    pub consent_port: u16,
    pub interactive_consent: bool,
    pub google_api_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let ollama_base_url = env::var("SCHEDULER_OLLAMA_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());
        let ollama_model =
            env::var("SCHEDULER_OLLAMA_MODEL").unwrap_or_else(|_| "mistral".to_string());
        let client_secrets_path = env::var("SCHEDULER_GOOGLE_CLIENT_SECRETS")
            .unwrap_or_else(|_| "credentials.json".to_string());
        let token_path =
            env::var("SCHEDULER_GOOGLE_TOKEN_PATH").unwrap_or_else(|_| "token.json".to_string());
        let calendar_id =
            env::var("SCHEDULER_GOOGLE_CALENDAR_ID").unwrap_or_else(|_| "primary".to_string());
        let calendar_api_base_url = env::var("SCHEDULER_CALENDAR_API_URL")
            .unwrap_or_else(|_| "https://www.googleapis.com".to_string());
        let gmail_api_base_url = env::var("SCHEDULER_GMAIL_API_URL")
            .unwrap_or_else(|_| "https://gmail.googleapis.com".to_string());
        // Must match a redirect URI registered for the OAuth client
        let consent_port = env::var("SCHEDULER_OAUTH_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let interactive_consent = env::var("SCHEDULER_INTERACTIVE_CONSENT")
            .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);
        let google_api_timeout_secs = env::var("SCHEDULER_GOOGLE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Self {
            ollama_base_url,
            ollama_model,
            client_secrets_path,
            token_path,
            calendar_id,
            calendar_api_base_url,
            gmail_api_base_url,
            consent_port,
            interactive_consent,
            google_api_timeout_secs,
        }
    }
}
