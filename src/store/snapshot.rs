// Vector index loaded from a JSON snapshot file and searched in memory
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::errors::{RagError, Result};
use crate::store::{
    cosine_similarity, scalar_to_string, MetadataFilter, Passage, RetrievalResult, ScoredPassage,
    VectorIndex,
};

/// On-disk snapshot layout
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    dimension: Option<usize>,
    passages: Vec<SnapshotEntry>,
}

#[derive(Debug, Deserialize)]
struct SnapshotEntry {
    #[serde(default)]
    id: Option<String>,
    content: String,
    #[serde(default)]
    metadata: HashMap<String, JsonValue>,
    embedding: Vec<f32>,
}

/// Immutable in-memory index; file order is the tie-break order
#[derive(Debug)]
pub struct SnapshotIndex {
    entries: Vec<(Passage, Vec<f32>)>,
    dimension: usize,
    source: Option<PathBuf>,
}

impl SnapshotIndex {
    /// Open a snapshot file read-only
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RagError::StoreUnavailable(format!(
                "vector index not found at {}",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            RagError::StoreUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;

        let file: SnapshotFile = serde_json::from_str(&contents).map_err(|e| {
            RagError::StoreUnavailable(format!("malformed index {}: {}", path.display(), e))
        })?;

        let entries = file
            .passages
            .into_iter()
            .enumerate()
            .map(|(position, entry)| {
                let metadata: BTreeMap<String, String> = entry
                    .metadata
                    .iter()
                    .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
                    .collect();
                let id = entry.id.unwrap_or_else(|| position.to_string());
                (Passage::new(id, entry.content, metadata), entry.embedding)
            })
            .collect();

        let mut index = Self::from_entries(entries)?;
        if let Some(declared) = file.dimension {
            if !index.entries.is_empty() && declared != index.dimension {
                return Err(RagError::StoreUnavailable(format!(
                    "index declares dimension {} but embeddings have {}",
                    declared, index.dimension
                )));
            }
            index.dimension = declared;
        }
        index.source = Some(path.to_path_buf());
        Ok(index)
    }

    /// Build from passages and their embeddings, in tie-break order
    pub fn from_entries(entries: Vec<(Passage, Vec<f32>)>) -> Result<Self> {
        let dimension = entries.first().map(|(_, e)| e.len()).unwrap_or(0);

        if let Some((passage, embedding)) = entries
            .iter()
            .find(|(_, e)| e.len() != dimension || e.is_empty())
        {
            return Err(RagError::StoreUnavailable(format!(
                "passage '{}' has embedding dimension {}, expected {}",
                passage.id,
                embedding.len(),
                dimension
            )));
        }

        Ok(Self {
            entries,
            dimension,
            source: None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl VectorIndex for SnapshotIndex {
    async fn nearest(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<RetrievalResult> {
        if !self.entries.is_empty() && vector.len() != self.dimension {
            return Err(RagError::EmbeddingError(format!(
                "query embedding has dimension {}, index expects {}",
                vector.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<ScoredPassage> = self
            .entries
            .iter()
            .filter(|(passage, _)| filter.map_or(true, |f| f.matches(&passage.metadata)))
            .map(|(passage, embedding)| ScoredPassage {
                passage: passage.clone(),
                score: cosine_similarity(vector, embedding),
            })
            .collect();

        // Stable sort: equal scores stay in file order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    fn describe(&self) -> String {
        match &self.source {
            Some(path) => format!(
                "snapshot {} ({} passages, dim {})",
                path.display(),
                self.entries.len(),
                self.dimension
            ),
            None => format!("in-memory snapshot ({} passages)", self.entries.len()),
        }
    }
}
