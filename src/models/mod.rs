//! External model capabilities
//!
//! The pipeline talks to the embedding model and the language model only
//! through two narrow traits, injected at construction:
//! - `Embedder`: text -> vector
//! - `Completer`: prompt -> text
//!
//! Implementations:
//! - `OllamaClient`: both capabilities over the Ollama HTTP API
//! - `LocalEmbedder`: in-process BERT embeddings via candle

pub mod client;
pub mod local;

use async_trait::async_trait;

use crate::errors::Result;

pub use client::OllamaClient;
pub use local::LocalEmbedder;

/// Embedding capability used to turn query text into a vector
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text. Failures surface as `RagError::EmbeddingError`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Decoding options passed to the completion capability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
}

impl CompletionOptions {
    /// Greedy decoding, so identical prompts yield closely-matching output
    pub fn deterministic() -> Self {
        Self { temperature: 0.0 }
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self::deterministic()
    }
}

/// Completion capability used to synthesise answers
#[async_trait]
pub trait Completer: Send + Sync {
    /// Complete a prompt. Failures surface as `RagError::GenerationError`.
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String>;
}
