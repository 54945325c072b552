use std::path::PathBuf;

use chrono::Utc;

use crate::{
    config::{self, Settings},
    spotify::{self, SpotifyError},
    types::Token,
};

/// Refresh this many seconds before the token actually expires.
const EXPIRY_MARGIN_SECS: u64 = 240;

pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub async fn load() -> Result<Self, String> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(path, json)
            .await
            .map_err(|e| e.to_string())
    }

    /// Returns an access token, refreshing and persisting it first when it is about to expire.
    pub async fn get_valid_token(&mut self, settings: &Settings) -> Result<String, SpotifyError> {
        if self.is_expired(Utc::now().timestamp() as u64) {
            self.token = spotify::auth::refresh_token(settings, &self.token.refresh_token).await?;
            if let Err(e) = self.persist().await {
                return Err(SpotifyError::Auth(format!(
                    "refreshed token could not be saved: {}",
                    e
                )));
            }
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self, now: u64) -> bool {
        let expires_at = self.token.obtained_at + self.token.expires_in;
        now >= expires_at.saturating_sub(EXPIRY_MARGIN_SECS)
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
