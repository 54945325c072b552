use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    Res,
    config::Settings,
    management::TokenManager,
    server::{AuthState, start_api_server},
    spotify::SpotifyError,
    success,
    types::{PkceToken, Token},
    utils, warning,
};

const AUTH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default)]
    scope: String,
    expires_in: Option<u64>,
}

impl TokenResponse {
    fn into_token(self, previous_refresh_token: &str) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .unwrap_or_else(|| previous_refresh_token.to_string()),
            scope: self.scope,
            expires_in: self.expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        }
    }
}

/// Runs the OAuth 2.0 PKCE flow and stores the resulting token.
pub async fn auth(settings: Arc<Settings>) -> Res<()> {
    let client_id = settings.client_id()?.to_string();
    let redirect_uri = settings.redirect_uri()?.to_string();

    // generate PKCE verifier and challenge
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let pkce: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(Some(PkceToken {
        code_verifier,
        token: None,
    })));

    let state = AuthState {
        pkce: Arc::clone(&pkce),
        settings: Arc::clone(&settings),
    };
    let server_addr = settings.server_address.clone();
    tokio::spawn(async move {
        if let Err(e) = start_api_server(&server_addr, state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    let auth_url = format!(
        "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}",
        auth_url = settings.spotify_auth_url,
        client_id = client_id,
        redirect_uri = redirect_uri,
        code_challenge = code_challenge,
        scope = settings.spotify_scope.replace(' ', "%20"),
    );

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(pkce)
        .await
        .ok_or("Authentication failed or timed out.")?;

    TokenManager::new(token).persist().await?;
    success!("Authentication successful!");
    Ok(())
}

async fn wait_for_token(pkce: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    let start = std::time::Instant::now();

    while start.elapsed() < AUTH_TIMEOUT {
        {
            let lock = pkce.lock().await;
            if let Some(token) = lock.as_ref().and_then(|p| p.token.clone()) {
                return Some(token);
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges the authorization code received on the callback for a token.
pub async fn exchange_code_pkce(
    settings: &Settings,
    code: &str,
    verifier: &str,
) -> Result<Token, SpotifyError> {
    let client_id = settings.client_id().map_err(SpotifyError::Auth)?;
    let redirect_uri = settings.redirect_uri().map_err(SpotifyError::Auth)?;

    let res = Client::new()
        .post(&settings.spotify_token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await?;

    read_token(res, "").await
}

/// Refreshes a token obtained through the PKCE flow.
pub async fn refresh_token(settings: &Settings, refresh_token: &str) -> Result<Token, SpotifyError> {
    let client_id = settings.client_id().map_err(SpotifyError::Auth)?;

    let res = Client::new()
        .post(&settings.spotify_token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
        ])
        .send()
        .await?;

    read_token(res, refresh_token).await
}

/// Refreshes a configured long-lived refresh token with the client credentials.
pub async fn refresh_with_client_credentials(
    settings: &Settings,
    refresh_token: &str,
) -> Result<Token, SpotifyError> {
    let client_id = settings.client_id().map_err(SpotifyError::Auth)?;
    let client_secret = settings.client_secret().map_err(SpotifyError::Auth)?;

    let res = Client::new()
        .post(&settings.spotify_token_url)
        .header("Authorization", utils::basic_auth(client_id, client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?;

    read_token(res, refresh_token).await
}

async fn read_token(
    res: reqwest::Response,
    previous_refresh_token: &str,
) -> Result<Token, SpotifyError> {
    let status = res.status();
    if !status.is_success() {
        let message = res.text().await.unwrap_or_default();
        return Err(SpotifyError::Auth(format!(
            "token request failed with status {}: {}",
            status.as_u16(),
            message
        )));
    }

    let token: TokenResponse = res.json().await?;
    Ok(token.into_token(previous_refresh_token))
}
