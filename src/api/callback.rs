use std::collections::HashMap;

use axum::{Extension, extract::Query, response::Html};

use crate::{server::AuthState, spotify, warning};

/// Receives the authorization code from Spotify and exchanges it for a token.
///
/// The token is put into the shared PKCE state where the waiting `auth`
/// command picks it up.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<AuthState>,
) -> Html<&'static str> {
    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let mut pkce = state.pkce.lock().await;
    let Some(pkce_state) = pkce.as_mut() else {
        return Html("<h4>Missing PKCE code verifier.</h4>");
    };

    let verifier = pkce_state.code_verifier.clone();
    match spotify::auth::exchange_code_pkce(&state.settings, code, &verifier).await {
        Ok(token) => {
            pkce_state.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>You can close this browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
