//! Process-wide OAuth credential for the calendar and mail APIs,
//! persisted to a token file between runs.

use std::path::{Path, PathBuf};

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::oauth::{ClientSecrets, TokenResponse, refresh_access_token, run_consent_flow};
use crate::core::AppConfig;
use crate::core::error::{Result, SchedulerError, credential_error};

/// Treat tokens this close to expiry as already expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Google doesn't always say how long a token lives
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp in seconds
    pub expires_at: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Credential {
    /// Build from a token endpoint response, keeping the previous
    /// refresh token when the response doesn't rotate it.
    pub fn from_token_response(resp: TokenResponse, previous_refresh_token: Option<String>) -> Self {
        Self {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token.or(previous_refresh_token),
            expires_at: Utc::now().timestamp() + resp.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
            scope: resp.scope,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at - EXPIRY_SKEW_SECS > Utc::now().timestamp()
    }
}

/// Hands out a valid access token, loading, refreshing or obtaining it
/// as needed. The mutex is held for the whole acquisition so only one
/// task ever refreshes, runs the consent flow or writes the token file.
#[derive(Debug)]
pub struct CredentialManager {
    client: Client,
    client_secrets_path: PathBuf,
    token_path: PathBuf,
    consent_port: u16,
    interactive_consent: bool,
    cached: Mutex<Option<Credential>>,
}

impl CredentialManager {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            client_secrets_path: PathBuf::from(&config.client_secrets_path),
            token_path: PathBuf::from(&config.token_path),
            consent_port: config.consent_port,
            interactive_consent: config.interactive_consent,
            cached: Mutex::new(None),
        }
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    pub async fn get_valid_credential(&self) -> Result<Credential> {
        let mut cached = self.cached.lock().await;

        if let Some(credential) = cached.as_ref().filter(|c| c.is_valid()) {
            return Ok(credential.clone());
        }

        let stored = match cached.take() {
            Some(credential) => Some(credential),
            None => self.load().await?,
        };

        let credential = match stored {
            Some(credential) if credential.is_valid() => credential,
            Some(Credential {
                refresh_token: Some(refresh_token),
                ..
            }) => {
                tracing::info!("Access token expired, refreshing");
                let secrets = ClientSecrets::load(&self.client_secrets_path).await?;
                let resp = refresh_access_token(&self.client, &secrets, &refresh_token).await?;
                let refreshed = Credential::from_token_response(resp, Some(refresh_token));
                self.persist(&refreshed).await?;
                refreshed
            }
            _ if self.interactive_consent => self.consent().await?,
            _ => {
                return Err(SchedulerError::CredentialError(format!(
                    "No valid credential in {}. Run `scheduler auth` to authorize.",
                    self.token_path.display()
                )));
            }
        };

        *cached = Some(credential.clone());
        Ok(credential)
    }

    /// Run the consent flow unconditionally and replace the stored
    /// credential.
    pub async fn authorize(&self) -> Result<Credential> {
        let mut cached = self.cached.lock().await;
        let credential = self.consent().await?;
        *cached = Some(credential.clone());
        Ok(credential)
    }

    async fn consent(&self) -> Result<Credential> {
        tracing::info!("No usable credential, starting OAuth consent flow");
        let secrets = ClientSecrets::load(&self.client_secrets_path).await?;
        let resp = run_consent_flow(&self.client, &secrets, self.consent_port).await?;
        let credential = Credential::from_token_response(resp, None);
        self.persist(&credential).await?;
        Ok(credential)
    }

    async fn load(&self) -> Result<Option<Credential>> {
        let text = match tokio::fs::read_to_string(&self.token_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(credential_error(
                    &format!("Failed to read token file {}", self.token_path.display()),
                    e,
                ));
            }
        };
        match serde_json::from_str(&text) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                // A corrupt file is as good as no file, consent will overwrite it
                tracing::warn!(
                    "Ignoring unreadable token file {}: {}",
                    self.token_path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Write to a sibling temp file and rename so readers never see a
    /// half written token.
    async fn persist(&self, credential: &Credential) -> Result<()> {
        let json = serde_json::to_string_pretty(credential)
            .map_err(|e| credential_error("Failed to serialize credential", e))?;
        let tmp_path = self.token_path.with_extension("tmp");
        let write_err = |e: std::io::Error| {
            credential_error(
                &format!("Failed to write token file {}", self.token_path.display()),
                e,
            )
        };
        tokio::fs::write(&tmp_path, json).await.map_err(write_err)?;
        tokio::fs::rename(&tmp_path, &self.token_path)
            .await
            .map_err(write_err)?;
        tracing::debug!("Saved credential to {}", self.token_path.display());
        Ok(())
    }
}
