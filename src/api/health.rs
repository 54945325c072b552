use axum::response::Json;
use serde_json::{Value, json};

/// Reports that the callback server is up, with the crate version.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
