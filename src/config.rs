//! Configuration management for the Spotify dashboard job.
//!
//! Values come from environment variables, which may be provided through a
//! `.env` file in the local data directory. The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Credentials have no defaults. They are checked where they are used and a
//! missing one is reported as an error instead of a panic.

use std::{env, path::PathBuf};

use dotenv;

use crate::utils;

pub const APP_DIR: &str = "spotdash";

const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_SPOTIFY_SCOPE: &str = "user-library-read user-read-recently-played";
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_FETCH_LIMIT: usize = 500;
const DEFAULT_REFRESH_HOURS: &str = "6,18";
const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory structure if it doesn't exist. A missing `.env` file
/// is fine since every value can also come from the process environment; a
/// file that exists but cannot be parsed is an error.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotdash/.env`
/// - macOS: `~/Library/Application Support/spotdash/.env`
/// - Windows: `%LOCALAPPDATA%/spotdash/.env`
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Platform local data directory of the application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// All runtime settings of one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub spotify_api_url: String,
    pub spotify_auth_url: String,
    pub spotify_token_url: String,
    pub spotify_scope: String,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub spotify_refresh_token: Option<String>,
    pub spotify_redirect_uri: Option<String>,
    pub server_address: String,
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub fetch_limit: usize,
    pub use_sample_data: bool,
    pub sample_data_file: PathBuf,
    pub output_dir: PathBuf,
    pub history_file: PathBuf,
    pub full_refresh_hours: Vec<u32>,
    pub history_retention_days: i64,
}

impl Settings {
    /// Reads the settings from the process environment.
    ///
    /// Fails only on values that are present but malformed.
    pub fn from_env() -> Result<Self, String> {
        let data_dir = data_dir();

        let fetch_limit = match optional("FETCH_LIMIT") {
            Some(v) => v
                .parse::<usize>()
                .map_err(|_| format!("FETCH_LIMIT must be a positive number, got '{}'", v))?,
            None => DEFAULT_FETCH_LIMIT,
        };

        let history_retention_days = match optional("HISTORY_RETENTION_DAYS") {
            Some(v) => match v.parse::<i64>() {
                Ok(days) if days >= 7 => days,
                _ => {
                    return Err(format!(
                        "HISTORY_RETENTION_DAYS must be a number of at least 7, got '{}'",
                        v
                    ));
                }
            },
            None => DEFAULT_RETENTION_DAYS,
        };

        let full_refresh_hours = utils::parse_hours(
            &optional("FULL_REFRESH_HOURS").unwrap_or_else(|| DEFAULT_REFRESH_HOURS.to_string()),
        )
        .map_err(|e| format!("FULL_REFRESH_HOURS: {}", e))?;

        Ok(Self {
            spotify_api_url: or_default("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL),
            spotify_auth_url: or_default("SPOTIFY_API_AUTH_URL", DEFAULT_SPOTIFY_AUTH_URL),
            spotify_token_url: or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_TOKEN_URL),
            spotify_scope: or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SPOTIFY_SCOPE),
            spotify_client_id: optional("SPOTIFY_CLIENT_ID"),
            spotify_client_secret: optional("SPOTIFY_CLIENT_SECRET"),
            spotify_refresh_token: optional("SPOTIFY_REFRESH_TOKEN"),
            spotify_redirect_uri: optional("SPOTIFY_API_REDIRECT_URI"),
            server_address: or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            gemini_api_key: optional("GEMINI_API_KEY"),
            gemini_api_url: or_default("GEMINI_API_URL", DEFAULT_GEMINI_API_URL),
            gemini_model: or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            fetch_limit,
            use_sample_data: optional("USE_SAMPLE_DATA")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            sample_data_file: optional("SAMPLE_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("sample_data.json")),
            output_dir: optional("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("output")),
            history_file: optional("HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("history/playback.json")),
            full_refresh_hours,
            history_retention_days,
        })
    }

    pub fn client_id(&self) -> Result<&str, String> {
        required(&self.spotify_client_id, "SPOTIFY_CLIENT_ID")
    }

    pub fn client_secret(&self) -> Result<&str, String> {
        required(&self.spotify_client_secret, "SPOTIFY_CLIENT_SECRET")
    }

    pub fn redirect_uri(&self) -> Result<&str, String> {
        required(&self.spotify_redirect_uri, "SPOTIFY_API_REDIRECT_URI")
    }

    pub fn is_full_refresh_hour(&self, hour: u32) -> bool {
        self.full_refresh_hours.contains(&hour)
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn or_default(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, String> {
    value
        .as_deref()
        .ok_or_else(|| format!("{} must be set", key))
}
