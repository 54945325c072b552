//! Spotify Dashboard Library
//!
//! This library turns a user's Spotify listening data into dashboard-ready
//! statistics. A scheduled run pulls saved and recently played tracks,
//! aggregates them locally, optionally enriches the result with AI generated
//! insights and writes everything as CSV tables for a dashboard to pick up.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `management` - Token and playback history persistence
//! - `oracle` - AI enrichment (Gemini adapter, prompts, classification)
//! - `pipeline` - One scheduled run wired from the capability traits
//! - `report` - Observer interface used by the pipeline for progress output
//! - `server` - Local HTTP server for OAuth callbacks
//! - `sink` - CSV writer for the dashboard tables
//! - `source` - Event source contract and the sample data source
//! - `spotify` - Spotify Web API client implementation
//! - `stats` - Normalization, aggregation, favorite and genre computation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use spotdash::{config, stats};
//!
//! #[tokio::main]
//! async fn main() -> spotdash::Res<()> {
//!     config::load_env().await?;
//!     let report = stats::aggregate(&[]);
//!     assert_eq!(report.summary.total_tracks, 0);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod oracle;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod sink;
pub mod source;
pub mod spotify;
pub mod stats;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern throughout the application
/// using a boxed dynamic error trait object. This allows for flexible
/// error handling while maintaining Send + Sync bounds for async contexts.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Used for general information and status updates throughout the
/// application. Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```
/// info!("Fetching recently played tracks...");
/// info!("Fetched {} saved tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Dashboard data updated");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the process with exit code 1 right after printing. This is the
/// single terminal failure signal of a run and must only be used from the
/// command layer for fatal conditions, never from the statistics core.
///
/// # Example
///
/// ```
/// error!("Cannot fetch saved tracks: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues, e.g. an enrichment step that degraded to
/// "no result" while the run continues.
///
/// # Example
///
/// ```
/// warning!("Genre lookup failed, continuing without tags");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
