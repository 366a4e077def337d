//! Pipeline lifecycle state machine
//!
//! Three states, one transition out of the initial state:
//! - Uninitialized → Ready   (on: StoreOpened)
//! - Uninitialized → Failed  (on: StartupFailed)
//! - Ready and Failed are terminal
//!
//! `PipelineState` is the handle every request handler holds. It is written
//! exactly once at startup and read lock-free afterwards.

use std::sync::{Arc, OnceLock};

use crate::errors::{RagError, Result};
use crate::rag::{Answer, Query, RagPipeline};

/// Pipeline lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Startup has not finished
    Uninitialized,

    /// Serving requests (terminal)
    Ready,

    /// Startup failed; never serves (terminal)
    Failed,
}

/// Events that trigger stage transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupEvent {
    /// Document store opened and pipeline wired
    StoreOpened,

    /// Any startup-fatal error
    StartupFailed,
}

impl PipelineStage {
    /// Transition function; terminal stages accept no events
    pub fn transition(&self, event: StartupEvent) -> Result<PipelineStage> {
        use PipelineStage::*;
        use StartupEvent::*;

        match (self, event) {
            (Uninitialized, StoreOpened) => Ok(Ready),
            (Uninitialized, StartupFailed) => Ok(Failed),
            (from, event) => Err(RagError::InvalidTransition {
                from: format!("{:?}", from),
                event: format!("{:?}", event),
            }),
        }
    }
}

/// Outcome recorded once startup finishes
enum Outcome {
    Ready(Arc<RagPipeline>),
    Failed(String),
}

/// Shared readiness holder passed to every request handler
#[derive(Clone, Default)]
pub struct PipelineState {
    outcome: Arc<OnceLock<Outcome>>,
}

impl PipelineState {
    /// Fresh state in `Uninitialized`
    pub fn new() -> Self {
        Self::default()
    }

    /// State that is already `Ready`
    pub fn ready(pipeline: RagPipeline) -> Self {
        let state = Self::new();
        // A fresh state accepts its first transition
        let _ = state.mark_ready(pipeline);
        state
    }

    pub fn stage(&self) -> PipelineStage {
        match self.outcome.get() {
            None => PipelineStage::Uninitialized,
            Some(Outcome::Ready(_)) => PipelineStage::Ready,
            Some(Outcome::Failed(_)) => PipelineStage::Failed,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.stage() == PipelineStage::Ready
    }

    /// Uninitialized → Ready
    pub fn mark_ready(&self, pipeline: RagPipeline) -> Result<()> {
        self.record(StartupEvent::StoreOpened, Outcome::Ready(Arc::new(pipeline)))
    }

    /// Uninitialized → Failed
    pub fn mark_failed(&self, cause: impl Into<String>) -> Result<()> {
        self.record(StartupEvent::StartupFailed, Outcome::Failed(cause.into()))
    }

    fn record(&self, event: StartupEvent, outcome: Outcome) -> Result<()> {
        let current = self.stage();
        current.transition(event)?;
        self.outcome.set(outcome).map_err(|_| RagError::InvalidTransition {
            from: format!("{:?}", self.stage()),
            event: format!("{:?}", event),
        })
    }

    /// Why startup failed, if it did
    pub fn failure(&self) -> Option<&str> {
        match self.outcome.get() {
            Some(Outcome::Failed(cause)) => Some(cause),
            _ => None,
        }
    }

    /// The ready pipeline, or `NotReady`
    pub fn pipeline(&self) -> Result<Arc<RagPipeline>> {
        match self.outcome.get() {
            Some(Outcome::Ready(pipeline)) => Ok(Arc::clone(pipeline)),
            Some(Outcome::Failed(cause)) => Err(RagError::NotReady(format!(
                "startup failed: {}",
                cause
            ))),
            None => Err(RagError::NotReady(
                "RAG pipeline is not initialized".to_string(),
            )),
        }
    }

    /// Handle one query; rejected with `NotReady` unless `Ready`
    pub async fn handle(&self, query: &Query) -> Result<Answer> {
        let pipeline = self.pipeline()?;
        pipeline.handle(query).await
    }
}
