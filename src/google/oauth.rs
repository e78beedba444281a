//! OAuth 2.0 installed-app flow against Google: authorization URL,
//! local redirect listener, code exchange and token refresh.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Router, extract::Query, routing::get};
use reqwest::Client;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::core::error::{Result, SchedulerError, credential_error};

pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/gmail.send",
];

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// How long to wait for the user to finish consenting in the browser
const CONSENT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// OAuth client as downloaded from the Google Cloud console
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            credential_error(
                &format!("Failed to read client secrets {}", path.display()),
                e,
            )
        })?;
        Self::from_json(&text)
    }

    /// Accepts both the `installed` and `web` client layouts.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(text)
            .map_err(|e| credential_error("Invalid client secrets file", e))?;
        file.installed.or(file.web).ok_or_else(|| {
            SchedulerError::CredentialError(
                "Client secrets file has neither an `installed` nor a `web` client".to_string(),
            )
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

pub fn authorization_url(secrets: &ClientSecrets, redirect_uri: &str, state: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
        secrets.auth_uri,
        urlencoding::encode(&secrets.client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&SCOPES.join(" ")),
        urlencoding::encode(state)
    )
}

async fn request_token(
    client: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse> {
    let res = client
        .post(token_uri)
        .timeout(TOKEN_TIMEOUT)
        .form(params)
        .send()
        .await
        .map_err(|e| credential_error("Token request failed", e))?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(SchedulerError::CredentialError(format!(
            "Token request failed: {} ({})",
            status, text
        )));
    }
    serde_json::from_str(&text).map_err(|e| credential_error("Invalid token response", e))
}

pub async fn exchange_code_for_token(
    client: &Client,
    secrets: &ClientSecrets,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    request_token(
        client,
        &secrets.token_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await
}

pub async fn refresh_access_token(
    client: &Client,
    secrets: &ClientSecrets,
    refresh_token: &str,
) -> Result<TokenResponse> {
    request_token(
        client,
        &secrets.token_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Interactive consent: open the browser at Google's consent screen and
/// wait for the redirect on `http://localhost:{port}/`.
pub async fn run_consent_flow(
    client: &Client,
    secrets: &ClientSecrets,
    port: u16,
) -> Result<TokenResponse> {
    let redirect_uri = format!("http://localhost:{}/", port);
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = authorization_url(secrets, &redirect_uri, &state);

    // Bind before sending the user off so the redirect can't race us
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(|e| credential_error(&format!("Failed to listen on port {}", port), e))?;

    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    if let Err(e) = webbrowser::open(&auth_url) {
        tracing::warn!("Could not open a browser for consent: {}", e);
    }

    let code = wait_for_authorization_code(listener, &state).await?;
    exchange_code_for_token(client, secrets, &code, &redirect_uri).await
}

async fn wait_for_authorization_code(listener: TcpListener, expected_state: &str) -> Result<String> {
    let (tx, rx) = oneshot::channel::<CallbackParams>();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().route(
        "/",
        get(move |Query(params): Query<CallbackParams>| {
            let tx = Arc::clone(&tx);
            async move {
                if let Some(sender) = tx.lock().ok().and_then(|mut slot| slot.take()) {
                    let _ = sender.send(params);
                }
                "Authorization complete. You can close this window."
            }
        }),
    );

    tokio::spawn(async move {
        let shutdown = async move {
            let _ = shutdown_rx.await;
        };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            tracing::error!("Consent callback server failed: {}", e);
        }
    });

    let received = tokio::time::timeout(CONSENT_TIMEOUT, rx).await;
    let _ = shutdown_tx.send(());

    let params = received
        .map_err(|_| {
            SchedulerError::CredentialError("Timed out waiting for OAuth consent".to_string())
        })?
        .map_err(|e| credential_error("Consent callback server stopped", e))?;

    if let Some(error) = params.error {
        return Err(SchedulerError::CredentialError(format!(
            "Authorization denied: {}",
            error
        )));
    }
    if params.state.as_deref() != Some(expected_state) {
        return Err(SchedulerError::CredentialError(
            "OAuth state mismatch in consent callback".to_string(),
        ));
    }
    params.code.ok_or_else(|| {
        SchedulerError::CredentialError("No authorization code found in callback".to_string())
    })
}
