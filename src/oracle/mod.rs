//! # Enrichment Oracle
//!
//! AI generated insights on top of the local statistics. The statistics never
//! depend on an answer from here: every feature returns `Option` and a failed,
//! slow or unparseable answer simply means "no enrichment" for that feature.
//!
//! - [`Oracle`] - the contract, `prompt -> text` with an explicit timeout
//! - [`GeminiClient`] - Google Gemini implementation
//! - [`enrichment`] - the prompts and the parsing of their answers
//! - [`OracleClassifier`] - genre classification for artists without tags

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod enrichment;
mod gemini;

pub use enrichment::OracleClassifier;
pub use gemini::GeminiClient;

/// Options for one completion request.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Hard limit for the whole request.
    pub timeout: Duration,
    /// Ask the model to answer with JSON only.
    pub json: bool,
}

impl CompletionOptions {
    pub fn text(timeout: Duration) -> Self {
        Self {
            timeout,
            json: false,
        }
    }

    pub fn json(timeout: Duration) -> Self {
        Self {
            timeout,
            json: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

/// A text completion service.
#[async_trait]
pub trait Oracle: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str, options: &CompletionOptions)
    -> Result<String, OracleError>;
}
