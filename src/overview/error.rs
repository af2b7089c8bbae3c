//! Failure kinds of an overview attempt.

use thiserror::Error;

use crate::error::Error as CrateError;
use crate::source::SourceError;

/// Prefix shared by every wrapped failure message
pub const FAILURE_PREFIX: &str = "Failed to generate overview: ";

/// Message used when an underlying error renders as an empty string
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Errors that end an attempt in the `Failure` state
#[derive(Error, Debug)]
pub enum OverviewError {
    #[error("No readable files were found in this repository.")]
    EmptyInput,

    #[error("Failed to generate overview: {}", or_unknown(.0.to_string()))]
    Aggregation(#[source] SourceError),

    #[error("Failed to generate overview: {}", or_unknown(generation_detail(.0)))]
    Generation(#[source] CrateError),
}

fn generation_detail(err: &CrateError) -> String {
    match err {
        CrateError::Generation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn or_unknown(message: String) -> String {
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

impl From<OverviewError> for CrateError {
    fn from(err: OverviewError) -> Self {
        match err {
            OverviewError::Aggregation(e) => e.into(),
            OverviewError::Generation(e) => e,
            OverviewError::EmptyInput => CrateError::Other(OverviewError::EmptyInput.to_string()),
        }
    }
}
