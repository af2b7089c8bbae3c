//! Error types for the repoview crate

use thiserror::Error;

/// Result type for repoview operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for repoview operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Please retry after {retry_after_secs} seconds")]
    RateLimit {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Requested path or repository does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The generation service failed to produce an overview
    #[error("Generation error: {0}")]
    Generation(String),

    /// Markdown parsing or formatting error
    #[error("Markdown error: {0}")]
    Markdown(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
