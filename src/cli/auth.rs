//! Access token resolution and keyring storage

use anyhow::{Context, Result};
use dialoguer::Password;
use keyring::Entry;
use tracing::{debug, info};

use crate::error::ExportError;
use crate::yandex::{ClientConfig, MusicApi, YandexClient};

const KEYRING_SERVICE: &str = "ymexport";
const KEYRING_USER: &str = "access-token";

/// Finds, verifies and stores the OAuth token
pub struct TokenStore;

impl TokenStore {
    /// Pick the token to use: an explicit value (flag, env or `.env`), else
    /// the keyring
    ///
    /// Fails before any network traffic when neither is available.
    pub fn resolve(explicit: Option<String>) -> std::result::Result<String, ExportError> {
        if let Some(token) = explicit.filter(|t| !t.trim().is_empty()) {
            return Ok(token.trim().to_string());
        }

        match Self::load() {
            Ok(token) => {
                debug!("Using access token from keyring");
                Ok(token)
            }
            Err(e) => {
                debug!("No token in keyring: {:#}", e);
                Err(ExportError::Config(format!(
                    "{} is not set; pass --token, add it to a .env file, or run 'ymexport auth'",
                    crate::config::TOKEN_VAR
                )))
            }
        }
    }

    /// Prompt for a token if needed, verify it against the API and store it
    pub async fn authenticate(token: Option<String>, api_url: &str) -> Result<String> {
        let token = match token.filter(|t| !t.trim().is_empty()) {
            Some(token) => token,
            None => Password::new()
                .with_prompt("Yandex Music OAuth token")
                .interact()
                .context("Failed to read token")?,
        };
        let token = token.trim().to_string();

        let login = Self::verify(&token, api_url).await?;
        Self::store(&token)?;
        info!("Token stored in keyring");

        Ok(login)
    }

    /// Load the token from the keyring
    pub fn load() -> Result<String> {
        Self::entry()?
            .get_password()
            .context("No access token in keyring")
    }

    /// Store the token in the keyring
    pub fn store(token: &str) -> Result<()> {
        Self::entry()?
            .set_password(token)
            .context("Failed to store token in keyring")
    }

    /// Remove the stored token
    pub fn clear() -> Result<()> {
        let _ = Self::entry()?.delete_credential();
        info!("Token cleared from keyring");
        Ok(())
    }

    /// Look up the account the token belongs to; returns its login
    async fn verify(token: &str, api_url: &str) -> Result<String> {
        debug!("Verifying token against {}", api_url);

        let client = YandexClient::new(ClientConfig::new(token).with_base_url(api_url))?;
        let status = client
            .account_status()
            .await
            .context("Failed to verify token")?;

        let account = status.account;
        if account.user_id().is_none() {
            anyhow::bail!("Token was accepted but no account is attached to it");
        }

        Ok(account
            .login
            .or(account.display_name)
            .unwrap_or_else(|| "unknown".to_string()))
    }

    fn entry() -> Result<Entry> {
        Entry::new(KEYRING_SERVICE, KEYRING_USER).context("Failed to access keyring")
    }
}
