use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{Res, api, config::Settings, types::PkceToken};

/// Shared state between the `auth` command and the callback handler.
#[derive(Clone)]
pub struct AuthState {
    pub pkce: Arc<Mutex<Option<PkceToken>>>,
    pub settings: Arc<Settings>,
}

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)))
}

pub async fn start_api_server(addr: &str, state: AuthState) -> Res<()> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| format!("Failed to parse server address '{}': {}", addr, e))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
