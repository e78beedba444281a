//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum::Router;
use chrono::Utc;
use mockito::ServerGuard;
use serde_json::json;
use tempfile::TempDir;

use scheduler::api::{AppState, app};
use scheduler::core::AppConfig;
use scheduler::google::Credential;

/// Mock collaborators plus a config pointing at them. Keep the value
/// alive for the whole test, dropping it stops the mock servers and
/// removes the token directory.
pub struct TestEnv {
    pub dir: TempDir,
    pub ollama: ServerGuard,
    pub google: ServerGuard,
    pub config: AppConfig,
}

/// Creates mock servers and a temp dir holding a valid token so no
/// test ever reaches the OAuth consent flow.
pub async fn test_env() -> TestEnv {
    let env = test_env_without_token().await;
    let credential = Credential {
        access_token: String::from("test_access_token"),
        refresh_token: Some(String::from("test_refresh_token")),
        expires_at: Utc::now().timestamp() + 3600,
        scope: None,
    };
    std::fs::write(
        &env.config.token_path,
        serde_json::to_string(&credential).unwrap(),
    )
    .expect("Failed to write token file");
    env
}

pub async fn test_env_without_token() -> TestEnv {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let ollama = mockito::Server::new_async().await;
    let google = mockito::Server::new_async().await;

    let secrets_path = dir.path().join("credentials.json");
    std::fs::write(
        &secrets_path,
        json!({
            "installed": {
                "client_id": "test_client_id",
                "client_secret": "test_client_secret",
                "token_uri": format!("{}/token", google.url()),
            }
        })
        .to_string(),
    )
    .expect("Failed to write client secrets");

    let config = AppConfig {
        ollama_base_url: ollama.url(),
        ollama_model: String::from("mistral"),
        client_secrets_path: secrets_path.display().to_string(),
        token_path: dir.path().join("token.json").display().to_string(),
        calendar_id: String::from("primary"),
        calendar_api_base_url: google.url(),
        gmail_api_base_url: google.url(),
        consent_port: 0,
        interactive_consent: false,
        google_api_timeout_secs: 5,
    };

    TestEnv {
        dir,
        ollama,
        google,
        config,
    }
}

/// Creates a test application router from `config`
pub fn test_app(config: AppConfig) -> Router {
    let app_state = AppState::new(config);
    app(Arc::new(RwLock::new(app_state)))
}

/// An Ollama `/api/chat` response whose assistant message is `content`
pub fn ollama_reply(content: &str) -> String {
    json!({
        "model": "mistral",
        "created_at": "2025-08-15T10:00:00.000Z",
        "message": {"role": "assistant", "content": content},
        "done": true,
    })
    .to_string()
}

pub const BUDGET_CALL: &str = r#"{"title":"Budget call","participants":["a@x.com"],"start_time":"2025-08-16T15:00:00+05:30","duration_minutes":45,"agenda":"budget"}"#;

pub const CREATED_EVENT: &str = r#"{"id": "evt_001", "status": "confirmed", "htmlLink": "https://www.google.com/calendar/event?eid=evt_001"}"#;
