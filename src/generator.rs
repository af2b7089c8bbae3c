//! Overview generation service
//!
//! `OverviewGenerator` is the contract the orchestrator consumes: given the
//! assembled document, return a markdown overview. `AgentGenerator` fulfils
//! it with a rig agent over any completion model.

use std::future::Future;

use rig::{
    agent::{Agent, AgentBuilder},
    completion::{Chat, CompletionModel},
};
use tracing::{debug, error, instrument};

use crate::error::{Error, Result};

/// Instructions given to the model ahead of the repository document
pub const DEFAULT_PREAMBLE: &str = "You are an experienced software engineer. \
You will receive the contents of a source repository. Each file starts with a \
`// File: <path>` line and is framed by lines of `=` characters. \
Write a clear overview of the repository in markdown: its purpose, its main \
components and how they fit together, the technologies it uses, and how to \
build or run it. Refer to files by path where it helps the reader.";

/// Generation collaborator
pub trait OverviewGenerator: Send + Sync {
    /// Produce an overview for the assembled repository document
    fn generate_overview(&self, document: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Overview generator backed by a rig agent
pub struct AgentGenerator<M: CompletionModel> {
    agent: Agent<M>,
}

impl<M: CompletionModel> AgentGenerator<M> {
    pub fn new(model: M) -> Self {
        Self::with_preamble(model, DEFAULT_PREAMBLE)
    }

    pub fn with_preamble(model: M, preamble: &str) -> Self {
        let agent = AgentBuilder::new(model).preamble(preamble).build();
        Self { agent }
    }
}

impl<M> OverviewGenerator for AgentGenerator<M>
where
    M: CompletionModel + 'static,
{
    #[instrument(skip_all, fields(document_len = document.len()))]
    async fn generate_overview(&self, document: &str) -> Result<String> {
        debug!("Requesting overview from model");
        let overview = self.agent.chat(document, Vec::new()).await.map_err(|e| {
            error!(error = %e, "Overview request failed");
            Error::Generation(e.to_string())
        })?;

        if overview.trim().is_empty() {
            return Err(Error::Generation("The model returned an empty overview".to_string()));
        }
        debug!(overview_len = overview.len(), "Received overview");
        Ok(overview)
    }
}
