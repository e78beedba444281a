use anyhow::Result;

use crate::core::AppConfig;
use crate::google::CredentialManager;

/// Run the browser consent flow up front so the server never has to
/// block a request on it.
pub async fn run(config: AppConfig) -> Result<()> {
    let manager = CredentialManager::new(&config);
    let credential = manager.authorize().await?;
    println!(
        "Credential saved to {} (refresh token: {}).",
        manager.token_path().display(),
        if credential.refresh_token.is_some() {
            "yes"
        } else {
            "no"
        }
    );
    Ok(())
}
