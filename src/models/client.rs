//! Ollama API client
//!
//! Provides the two external capabilities over HTTP:
//! - Endpoint: POST /api/embeddings (Embedder)
//! - Endpoint: POST /api/generate, non-streaming (Completer)
//!
//! No retries happen here. A dropped future aborts the in-flight request.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::config::Config;
use crate::errors::{RagError, Result};
use crate::models::{CompletionOptions, Completer, Embedder};

/// Ollama HTTP client implementing `Embedder` and `Completer`
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    chat_model: String,
    embedding_model: String,
}

impl OllamaClient {
    /// Create Ollama client with custom configuration
    pub fn with_config(
        base_url: &str,
        chat_model: &str,
        embedding_model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            chat_model: chat_model.to_string(),
            embedding_model: embedding_model.to_string(),
        })
    }

    /// Build from the `[ollama]` config section
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_config(
            &config.ollama_url(),
            &config.ollama.chat_model,
            &config.ollama.embedding_model,
            Duration::from_secs(config.ollama.timeout_secs.max(1)),
        )
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<R, String> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("HTTP {}: {}", status, error_text));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            prompt: text,
        };

        let response: EmbeddingResponse = self
            .post_json("/api/embeddings", &request)
            .await
            .map_err(RagError::EmbeddingError)?;

        if response.embedding.is_empty() {
            return Err(RagError::EmbeddingError(format!(
                "model '{}' returned an empty embedding",
                self.embedding_model
            )));
        }

        Ok(response.embedding)
    }
}

#[async_trait]
impl Completer for OllamaClient {
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String> {
        let request = GenerateRequest {
            model: &self.chat_model,
            prompt,
            stream: false,
            options: json!({ "temperature": options.temperature }),
        };

        let response: GenerateResponse = self
            .post_json("/api/generate", &request)
            .await
            .map_err(RagError::GenerationError)?;

        Ok(response.response.trim().to_string())
    }
}

/// Ollama embeddings request
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Ollama embeddings response
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// Ollama generate request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: serde_json::Value,
}

/// Ollama generate response (non-streaming)
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}
