//! Error types for palette-crawler
//!
//! Per-candidate rejections are not errors: they come back as
//! `PipelineOutcome::Discarded`. `CrawlError` covers what the caller has to
//! act on: transport failures for a single candidate, upstream API failures
//! and the fatal startup cases.

use thiserror::Error;

/// Crawler error type
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Download or HTTP failure (recoverable, abandons one candidate)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream API answered with a failure status
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Upstream API response could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Credentials missing or rejected (fatal)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Invalid configuration (fatal)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal failure (e.g. a blocking task panicked)
    #[error("Internal error: {0}")]
    Internal(String),

    /// palette-common error
    #[error("Common error: {0}")]
    Common(#[from] palette_common::Error),
}

impl From<reqwest::Error> for CrawlError {
    fn from(err: reqwest::Error) -> Self {
        CrawlError::Transport(err.to_string())
    }
}

/// Result type for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;
