//! Document store: embedded passages with metadata and filtered similarity search
//!
//! The store is opened once at startup and is read-only afterwards. It is
//! shared by handle between all requests; reads take no locks.
//!
//! Components:
//! - `VectorIndex`: nearest-neighbour search over stored passage embeddings
//! - `SnapshotIndex`: JSON snapshot file searched in memory
//! - `QdrantIndex`: existing Qdrant collection searched remotely
//! - `DocumentStore`: embeds query text, then searches an index

pub mod qdrant;
pub mod snapshot;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{Config, StoreBackend};
use crate::errors::{RagError, Result};
use crate::models::Embedder;

pub use qdrant::QdrantIndex;
pub use snapshot::SnapshotIndex;

/// Metadata key carrying a passage's access tag
pub const ACCESS_LEVEL_KEY: &str = "access_level";

/// Metadata key naming the source document
pub const FILE_NAME_KEY: &str = "file_name";

/// Metadata key naming the source page
pub const PAGE_NO_KEY: &str = "page_no";

/// One retrievable unit of document content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub content: String,
    pub metadata: BTreeMap<String, String>,
}

impl Passage {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
        }
    }

    /// Metadata lookup by key
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn access_level(&self) -> Option<&str> {
        self.meta(ACCESS_LEVEL_KEY)
    }
}

/// A passage paired with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
}

/// Ordered passages, similarity descending, at most `k` long
pub type RetrievalResult = Vec<ScoredPassage>;

/// Equality constraint on one metadata field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataFilter {
    pub key: String,
    pub value: String,
}

impl MetadataFilter {
    pub fn eq(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Exact, case-sensitive match
    pub fn matches(&self, metadata: &BTreeMap<String, String>) -> bool {
        metadata.get(&self.key).is_some_and(|v| *v == self.value)
    }
}

/// Nearest-neighbour search over stored passage embeddings
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Up to `k` passages closest to `vector` that satisfy `filter`.
    /// Equal scores keep a stable, index-defined order.
    async fn nearest(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<RetrievalResult>;

    /// Human-readable description for logs and the info banner
    fn describe(&self) -> String;
}

/// Embeds queries and searches the underlying index
#[derive(Clone)]
pub struct DocumentStore {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl DocumentStore {
    /// Create a store over an already-opened index
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Open the configured persisted index. Fails with `StoreUnavailable`.
    pub async fn open(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let index: Arc<dyn VectorIndex> = match config.store.backend {
            StoreBackend::Snapshot => Arc::new(SnapshotIndex::open(&config.store_path())?),
            StoreBackend::Qdrant => Arc::new(
                QdrantIndex::connect(&config.store.qdrant_url, &config.store.collection).await?,
            ),
        };

        info!(index = %index.describe(), "Document store opened");
        Ok(Self::new(embedder, index))
    }

    /// Embed `query_text` and return up to `k` nearest passages passing `filter`
    pub async fn search(
        &self,
        query_text: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(RagError::InvalidQuery("k must be a positive integer".to_string()));
        }

        let vector = self.embedder.embed(query_text).await?;
        let result = self.index.nearest(&vector, k, filter).await?;

        debug!(
            k,
            filter = ?filter.map(|f| (&f.key, &f.value)),
            hits = result.len(),
            "Similarity search complete"
        );

        Ok(result)
    }
}

/// Cosine similarity; zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Render a JSON scalar as a metadata string
pub(crate) fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
