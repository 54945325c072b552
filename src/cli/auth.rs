use std::sync::Arc;

use crate::{config::Settings, error, spotify};

pub async fn auth(settings: Arc<Settings>) {
    if let Err(e) = spotify::auth::auth(settings).await {
        error!("Authorization failed: {}", e);
    }
}
