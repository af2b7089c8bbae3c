//! # repoview - Repository Overviews from a Language Model
//!
//! This crate turns a source repository into a readable overview. It lists
//! the repository, fetches every readable file, joins them into one
//! delimited document, asks a language model to summarize it, and renders
//! the markdown answer for the terminal.
//!
//! ## Features
//!
//! - GitHub and local-directory repository sources
//! - Deterministic document assembly with per-file headers
//! - Single-flight generation lifecycle with stale-result protection
//! - Rate-limited Gemini completions through rig
//! - Terminal markdown rendering with a raw-text fallback
//!
//! ## Example
//!
//! ```rust,no_run
//! use repoview::prelude::*;
//! use repoview::model::{Client, DEFAULT_MODEL};
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let source = LocalSource::new(".");
//!     let tree = source.fetch_tree().await?;
//!
//!     let client = Client::new_gemini_from_env(DEFAULT_MODEL)?;
//!     let orchestrator = Orchestrator::new(source, client.generator(DEFAULT_PREAMBLE));
//!
//!     if let Some(state) = orchestrator.generate(&tree).await {
//!         let formatting = Formatting::available(TerminalMarkdown::colored());
//!         println!("{}", render(&state, &formatting));
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod assemble;
mod error;
pub mod generator;
pub mod markdown;
pub mod model;
pub mod overview;
pub mod present;
pub mod source;
pub mod tree;

pub use error::{Error, Result};

/// Re-export of the types most callers need
pub mod prelude {
    pub use crate::aggregate::{Aggregation, FetchedFile, aggregate, fetch_all_file_contents};
    pub use crate::assemble::assemble;
    pub use crate::error::{Error, Result};
    pub use crate::generator::{AgentGenerator, DEFAULT_PREAMBLE, OverviewGenerator};
    pub use crate::markdown::TerminalMarkdown;
    pub use crate::overview::{GenerationState, Orchestrator, OverviewConfig, OverviewError};
    pub use crate::present::{DisplayPayload, Formatting, MarkupRenderer, render};
    pub use crate::source::{GithubSource, LocalSource, RepositorySource, SourceError, SourceOptions};
    pub use crate::tree::{NodeKind, TreeNode};
}
