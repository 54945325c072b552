//! # CLI Module
//!
//! Command implementations behind the `spotdash` binary. Each command loads
//! what it needs, delegates the work and reports through the console macros.
//! Fatal conditions end in [`crate::error!`], which exits with status 1.
//!
//! - [`auth`] - OAuth 2.0 PKCE authorization with Spotify
//! - [`run`] - one scheduled run: playback tracking and, at refresh hours,
//!   library statistics and enrichment
//! - [`history`] - most played tracks from the persisted playback log
//!
//! ## Typical setup
//!
//! ```bash
//! spotdash auth                # once, stores the token
//! spotdash run                 # from cron, e.g. every 30 minutes
//! spotdash run --full --no-ai  # force the statistics without enrichment
//! spotdash history --days 7
//! ```

mod auth;
mod history;
mod run;

pub use auth::auth;
pub use history::history;
pub use run::{RunOptions, run};
