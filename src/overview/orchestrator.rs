//! Drives one overview attempt at a time and owns the visible state.
//!
//! Every transition goes through the watch channel's modify closures, so the
//! attempt counter and the state always change together. A result is applied
//! only while its attempt is still current and the state is still `Loading`;
//! anything finishing after a reset is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use super::error::OverviewError;
use super::state::GenerationState;
use crate::aggregate::aggregate_with_concurrency;
use crate::assemble::assemble;
use crate::generator::OverviewGenerator;
use crate::source::{DEFAULT_FETCH_CONCURRENCY, RepositorySource};
use crate::tree::TreeNode;

/// Identifies one `Loading` episode
pub type AttemptId = u64;

struct Inner<S, G> {
    source: S,
    generator: G,
    fetch_concurrency: usize,
    state: watch::Sender<GenerationState>,
    attempt: AtomicU64,
}

/// Generation state machine over a repository source and a generator
pub struct Orchestrator<S, G> {
    inner: Arc<Inner<S, G>>,
}

impl<S, G> Clone for Orchestrator<S, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, G> Orchestrator<S, G>
where
    S: RepositorySource + 'static,
    G: OverviewGenerator + 'static,
{
    pub fn new(source: S, generator: G) -> Self {
        Self::with_fetch_concurrency(source, generator, DEFAULT_FETCH_CONCURRENCY)
    }

    pub fn with_fetch_concurrency(source: S, generator: G, fetch_concurrency: usize) -> Self {
        let (state, _) = watch::channel(GenerationState::Idle);
        Self {
            inner: Arc::new(Inner {
                source,
                generator,
                fetch_concurrency,
                state,
                attempt: AtomicU64::new(0),
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Snapshot of the current state
    pub fn state(&self) -> GenerationState {
        self.inner.state.borrow().clone()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.inner.state.subscribe()
    }

    /// The attempt a result must carry to be applied
    pub fn current_attempt(&self) -> AttemptId {
        self.inner.attempt.load(Ordering::SeqCst)
    }

    /// Move from `Idle` to `Loading` and hand out the new attempt id.
    ///
    /// Returns `None` without touching the state when an attempt is already
    /// running or a finished result has not been dismissed yet.
    pub fn begin(&self) -> Option<AttemptId> {
        let mut started = None;
        let mut current = "idle";
        self.inner.state.send_if_modified(|state| {
            if !state.is_idle() {
                current = state.name();
                return false;
            }
            let attempt = self.inner.attempt.fetch_add(1, Ordering::SeqCst) + 1;
            *state = GenerationState::Loading;
            started = Some(attempt);
            true
        });

        match started {
            Some(attempt) => info!(attempt, "Overview generation started"),
            None => warn!(state = current, "Ignoring start while not idle"),
        }
        started
    }

    /// Run aggregation, assembly and generation for `attempt`.
    ///
    /// Returns the outcome even when it was discarded as stale.
    #[instrument(skip_all, fields(attempt = attempt))]
    pub async fn run(&self, attempt: AttemptId, tree: &TreeNode) -> GenerationState {
        let outcome = match self.produce(tree).await {
            Ok(overview) => GenerationState::Success(overview),
            Err(e) => {
                warn!(error = %e, "Overview generation failed");
                GenerationState::Failure(e.to_string())
            }
        };

        if self.apply(attempt, outcome.clone()) {
            info!(state = outcome.name(), "Overview generation finished");
        } else {
            debug!(current = self.current_attempt(), "Discarding stale result");
        }
        outcome
    }

    async fn produce(&self, tree: &TreeNode) -> Result<String, OverviewError> {
        let aggregation =
            aggregate_with_concurrency(&self.inner.source, tree, self.inner.fetch_concurrency)
                .await
                .map_err(OverviewError::Aggregation)?;
        if aggregation.is_empty() {
            return Err(OverviewError::EmptyInput);
        }

        let document = assemble(&aggregation.files);
        debug!(
            files = aggregation.files.len(),
            document_len = document.len(),
            "Assembled document"
        );
        self.inner
            .generator
            .generate_overview(&document)
            .await
            .map_err(OverviewError::Generation)
    }

    fn apply(&self, attempt: AttemptId, outcome: GenerationState) -> bool {
        self.inner.state.send_if_modified(|state| {
            if self.inner.attempt.load(Ordering::SeqCst) != attempt || !state.is_loading() {
                return false;
            }
            *state = outcome;
            true
        })
    }

    /// Start an attempt in the background.
    ///
    /// Returns `None` when the orchestrator is not idle.
    pub fn start(&self, tree: TreeNode) -> Option<JoinHandle<GenerationState>> {
        let attempt = self.begin()?;
        let this = self.clone();
        let span = info_span!("overview_attempt", attempt, source = %self.inner.source.describe());
        Some(tokio::spawn(
            async move { this.run(attempt, &tree).await }.instrument(span),
        ))
    }

    /// Run an attempt to completion on the current task
    pub async fn generate(&self, tree: &TreeNode) -> Option<GenerationState> {
        let attempt = self.begin()?;
        self.run(attempt, tree).await;
        Some(self.state())
    }

    /// Return to `Idle` and invalidate any attempt in flight
    pub fn reset(&self) {
        self.inner.state.send_modify(|state| {
            self.inner.attempt.fetch_add(1, Ordering::SeqCst);
            *state = GenerationState::Idle;
        });
        info!("Overview state reset");
    }
}
