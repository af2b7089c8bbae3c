//! # LLM Client Module
//!
//! Builds the completion model that backs overview generation, with
//! client-side rate limiting so repeated runs stay inside the provider quota.
//!
//! ## Key Components
//!
//! - `Client`: wraps a completion model and hands out an `AgentGenerator`
//! - `RateLimitedCompletionModel`: paces any completion model with a governor quota
//! - `MockCompletionModel`: scriptable model for tests
//!
//! API keys come from the environment: `GEMINI_API_KEY` for the standard
//! tier, `GEMINI_FREE_API_KEY` for the free tier.

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use ratelimited_completion::RateLimitedCompletionModel;
use rig::{completion::CompletionModel, providers::gemini};

use crate::error::{Error, Result};
use crate::generator::AgentGenerator;

pub mod mock_model;
pub mod ratelimited_completion;

pub use mock_model::MockCompletionModel;

/// Default model for the standard tier
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default model for the free tier
pub const DEFAULT_FREE_MODEL: &str = "gemini-2.0-flash-lite";

#[derive(Debug, Clone)]
pub struct Client<C>
where
    C: CompletionModel,
{
    completion_model: C,
}

pub struct RateLimitResponse<T> {
    #[allow(dead_code)]
    response: T,
}

impl Client<RateLimitedCompletionModel<gemini::completion::CompletionModel>> {
    pub fn new_gemini_from_env(model: &str) -> Result<Self> {
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Auth("GEMINI_API_KEY environment variable must be set".to_string()))?;
        let gemini_client = gemini::Client::new(&gemini_api_key);
        Ok(Self::new_gemini(gemini_client, model))
    }

    pub fn new_gemini_free_from_env(model: &str) -> Result<Self> {
        let gemini_api_key = std::env::var("GEMINI_FREE_API_KEY").map_err(|_| {
            Error::Auth("GEMINI_FREE_API_KEY environment variable must be set".to_string())
        })?;
        let gemini_client = gemini::Client::new(&gemini_api_key);
        Ok(Self::new_gemini_free(gemini_client, model))
    }

    pub fn new_gemini(gemini_client: gemini::Client, model: &str) -> Self {
        Self::with_quota(gemini_client, model, NonZeroU32::new(2000).unwrap_or(NonZeroU32::MIN))
    }

    pub fn new_gemini_free(gemini_client: gemini::Client, model: &str) -> Self {
        Self::with_quota(gemini_client, model, NonZeroU32::new(30).unwrap_or(NonZeroU32::MIN))
    }

    fn with_quota(gemini_client: gemini::Client, model: &str, per_minute: NonZeroU32) -> Self {
        let completion_limiter = RateLimiter::direct(Quota::per_minute(per_minute));
        let completion_model =
            RateLimitedCompletionModel::new(gemini_client.completion_model(model), completion_limiter);
        Self { completion_model }
    }
}

impl<C> Client<C>
where
    C: CompletionModel,
{
    /// Wrap an already constructed completion model
    pub fn from_model(completion_model: C) -> Self {
        Self { completion_model }
    }

    pub fn completion(&self) -> &C {
        &self.completion_model
    }

    /// Build an overview generator around this client's model
    pub fn generator(&self, preamble: &str) -> AgentGenerator<C> {
        AgentGenerator::with_preamble(self.completion_model.clone(), preamble)
    }
}
