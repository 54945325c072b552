//! Local persistence: the OAuth token and the playback history log.

mod auth;
mod history;

pub use auth::TokenManager;
pub use history::{HistoryError, PlayHistory, WINDOW_DAYS};
