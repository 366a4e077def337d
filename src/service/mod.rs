//! Pipeline orchestration: startup wiring and readiness
//!
//! Startup runs once: choose the embedding capability, open the document
//! store, wire retriever and generator, then move the shared
//! `PipelineState` to `Ready` (or `Failed`).

pub mod state;

use std::sync::Arc;
use tracing::{error, info};

use crate::config::{Config, EmbedderBackend};
use crate::errors::{RagError, Result};
use crate::models::{Completer, Embedder, LocalEmbedder, OllamaClient};
use crate::rag::{AccessPolicy, AnswerGenerator, RagPipeline, Retriever};
use crate::store::DocumentStore;

pub use state::{PipelineStage, PipelineState, StartupEvent};

/// Build the pipeline from injected capabilities
pub async fn build_pipeline(
    config: &Config,
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn Completer>,
) -> Result<RagPipeline> {
    let store = DocumentStore::open(config, embedder).await?;
    let retriever = Retriever::with_top_k(
        store,
        AccessPolicy::new(config.retrieval.privileged_role.clone()),
        config.retrieval.top_k,
    );
    Ok(RagPipeline::new(retriever, AnswerGenerator::new(completer)))
}

/// Construct the configured capabilities
pub fn capabilities_from_config(config: &Config) -> Result<(Arc<dyn Embedder>, Arc<dyn Completer>)> {
    let ollama = Arc::new(OllamaClient::from_config(config)?);

    let embedder: Arc<dyn Embedder> = match config.embedder.backend {
        EmbedderBackend::Ollama => ollama.clone() as Arc<dyn Embedder>,
        EmbedderBackend::Local => {
            info!(model = %config.embedder.local_model, "Loading local embedding model");
            let local = LocalEmbedder::load(&config.embedder.local_model).map_err(|e| {
                RagError::ConfigError(format!("local embedding model unavailable: {}", e))
            })?;
            Arc::new(local)
        }
    };

    let completer: Arc<dyn Completer> = ollama;
    Ok((embedder, completer))
}

/// Run startup against `state`, recording Ready or Failed
pub async fn start(
    state: &PipelineState,
    config: &Config,
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn Completer>,
) -> Result<()> {
    info!("Loading vector store...");
    match build_pipeline(config, embedder, completer).await {
        Ok(pipeline) => {
            state.mark_ready(pipeline)?;
            info!("RAG pipeline ready");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "Startup failed");
            state.mark_failed(err.to_string())?;
            Err(err)
        }
    }
}
