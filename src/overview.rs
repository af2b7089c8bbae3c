//! # Overview Lifecycle
//!
//! Turns a repository tree into a generated overview and tracks the visible
//! state of that work: `Idle`, `Loading`, then `Success` or `Failure`, with a
//! reset back to `Idle` at any time.
//!
//! - `Orchestrator`: single-flight state machine over a source and a generator
//! - `GenerationState`: the observable state
//! - `OverviewError`: why an attempt failed
//! - `OverviewConfig`: model, preamble and source limits for a run

pub mod config;
pub mod error;
mod orchestrator;
pub mod state;

pub use config::{OverviewConfig, OverviewConfigBuilder};
pub use error::OverviewError;
pub use orchestrator::{AttemptId, Orchestrator};
pub use state::GenerationState;
