//! # API Module
//!
//! HTTP endpoints of the temporary local server started by `spotdash auth`.
//!
//! - [`callback`] - completes the OAuth 2.0 PKCE flow by exchanging the
//!   authorization code Spotify redirects with for an access token.
//! - [`health`] - reports status and version, handy to check that the
//!   redirect URI points at the right address before authorizing.
//!
//! The server only lives for the duration of the `auth` command.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
