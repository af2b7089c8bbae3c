//! Error types for repository sources

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for tree and file fetches
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api { status_code: u16, message: String },

    /// Missing or rejected credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The service quota is exhausted
    #[error("Rate limit exceeded. Please retry after {retry_after_secs} seconds")]
    RateLimit { retry_after_secs: u64 },

    /// Path, reference or repository does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Content is not text
    #[error("Binary content: {0}")]
    Binary(String),

    /// Content exceeds the configured size limit
    #[error("File too large: {path} ({size} bytes, limit {limit})")]
    TooLarge { path: String, size: u64, limit: u64 },

    /// Local filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Response payload could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SourceError {
    /// Errors that apply to every request against the source, not just one
    /// file. Aggregation aborts on these instead of skipping the file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SourceError::Auth(_) | SourceError::RateLimit { .. })
    }
}

impl From<SourceError> for CrateError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Http(e) => CrateError::Http(e),
            SourceError::Io(e) => CrateError::Io(e),
            SourceError::Json(e) => CrateError::Json(e),
            SourceError::Api {
                status_code,
                message,
            } => CrateError::Api {
                status_code,
                message,
            },
            SourceError::Auth(msg) => CrateError::Auth(msg),
            SourceError::RateLimit { retry_after_secs } => {
                CrateError::RateLimit { retry_after_secs }
            }
            SourceError::NotFound(msg) => CrateError::NotFound(msg),
            other => CrateError::Other(other.to_string()),
        }
    }
}
