//! HTTP client for a running rolerag server
//!
//! Used by `rolerag ask`. Error bodies are decoded so the server's cause is
//! shown instead of a bare status line.

use reqwest::Client;
use std::time::Duration;

use crate::errors::{RagError, Result};
use crate::server::{ErrorResponse, QueryRequest, QueryResponse};

/// Client timeout; generation can be slow on local models
const CLIENT_TIMEOUT: Duration = Duration::from_secs(300);

pub struct QueryClient {
    client: Client,
    base_url: String,
}

impl QueryClient {
    /// Create a client for `base_url` (e.g. http://127.0.0.1:8000)
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST /query
    pub async fn ask(&self, question: &str, role: &str) -> Result<QueryResponse> {
        let url = format!("{}/query", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&QueryRequest {
                question: question.to_string(),
                user_role: role.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.detail)
            .unwrap_or(body);

        Err(match status.as_u16() {
            503 => RagError::NotReady(detail),
            400 => RagError::InvalidQuery(detail),
            _ => RagError::Generic(format!("HTTP {}: {}", status, detail)),
        })
    }
}
