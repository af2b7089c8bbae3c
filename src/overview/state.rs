//! Visible lifecycle of one overview attempt.

use serde::{Deserialize, Serialize};

/// Current state of overview generation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "payload", rename_all = "lowercase")]
pub enum GenerationState {
    /// Nothing requested yet, or the panel was dismissed
    #[default]
    Idle,

    /// Aggregation or generation is in progress
    Loading,

    /// Generated overview in markup form
    Success(String),

    /// User-facing failure message
    Failure(String),
}

impl GenerationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GenerationState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, GenerationState::Loading)
    }

    /// Success or Failure
    pub fn is_finished(&self) -> bool {
        matches!(self, GenerationState::Success(_) | GenerationState::Failure(_))
    }

    /// Short lowercase name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            GenerationState::Idle => "idle",
            GenerationState::Loading => "loading",
            GenerationState::Success(_) => "success",
            GenerationState::Failure(_) => "failure",
        }
    }
}
