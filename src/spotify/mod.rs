//! # Spotify Integration Module
//!
//! This module is the integration layer between the dashboard job and the
//! Spotify Web API. It handles authentication, paging through the user's
//! library, the recently played buffer and the genre lookups the genre
//! reconciliation relies on.
//!
//! ## Architecture
//!
//! ```text
//! Pipeline (cli::run)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (OAuth 2.0 PKCE, refresh token grant)
//!     └── Client (saved tracks, recently played, tracks, artists)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Authentication Strategy
//!
//! Two ways to obtain an access token are supported:
//!
//! 1. **Configured refresh token**: when `SPOTIFY_REFRESH_TOKEN` is set, it is
//!    exchanged with the client credentials (HTTP basic auth) on every run.
//!    This suits unattended hosts where no browser is available.
//! 2. **PKCE flow**: `spotdash auth` opens the browser, receives the code on
//!    the local callback server and stores the token. Later runs reuse and
//!    refresh it through the token manager.
//!
//! ## Error Handling
//!
//! - **Bad Gateway**: retried a few times after a fixed delay.
//! - **Too Many Requests**: the `Retry-After` header is honored up to two
//!   minutes, longer waits are reported as [`SpotifyError::RateLimited`].
//! - **Timeouts**: every request has a client-level timeout so a run can
//!   never hang on the network.
//!
//! ## API Coverage
//!
//! - `GET /me/tracks` - saved tracks, offset paging
//! - `GET /me/player/recently-played` - last 50 plays
//! - `GET /tracks?ids=` - batch track lookup (primary artist per track)
//! - `GET /artists?ids=` - batch artist lookup (genres)
//! - `GET /tracks/{id}`, `GET /artists/{id}` - details of a single track
//! - `POST /api/token` - token exchange and refresh

use thiserror::Error;

pub mod auth;
mod client;

pub use client::SpotifyClient;

/// Errors returned by the Spotify adapter.
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}
