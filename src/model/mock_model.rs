//! # Mock Completion Model for Testing
//!
//! Provides a `MockCompletionModel` that implements the `CompletionModel` trait
//! for use in tests. It can be scripted to return text or fail, counts the
//! requests it receives, and can hold requests until released so tests can
//! observe in-flight behavior.

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    one_or_many::OneOrMany,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, Notify};

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Error(String),
}

/// A mock completion model for testing purposes.
#[derive(Debug, Clone)]
pub struct MockCompletionModel {
    response: Arc<Mutex<Option<Scripted>>>,
    calls: Arc<AtomicUsize>,
    held: Arc<AtomicBool>,
    gate: Arc<Notify>,
    started: Arc<Notify>,
}

impl MockCompletionModel {
    /// Creates a new mock model that will return an empty text response.
    pub fn new() -> Self {
        Self {
            response: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
            held: Arc::new(AtomicBool::new(false)),
            gate: Arc::new(Notify::new()),
            started: Arc::new(Notify::new()),
        }
    }

    /// Helper to create a simple text response.
    pub async fn set_text_response(&self, text: &str) {
        *self.response.lock().await = Some(Scripted::Text(text.to_string()));
    }

    /// Make every request fail with a provider error carrying `message`.
    pub async fn set_error(&self, message: &str) {
        *self.response.lock().await = Some(Scripted::Error(message.to_string()));
    }

    /// Hold requests until [`release`](Self::release) is called.
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Let one held request complete.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Wait until a request has reached the model.
    pub async fn wait_for_request(&self) {
        self.started.notified().await;
    }

    /// Number of completion requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCompletionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        _completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        if self.held.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }

        let scripted = {
            let guard = self.response.lock().await;
            guard.clone()
        };
        match scripted {
            Some(Scripted::Text(text)) => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text(text.clone())),
                raw_response: text,
            }),
            Some(Scripted::Error(message)) => Err(CompletionError::ProviderError(message)),
            None => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text("")),
                raw_response: "".to_string(),
            }),
        }
    }
}
