// Role-scoped retrieval: access policy + document store

use crate::errors::Result;
use crate::rag::policy::AccessPolicy;
use crate::store::{DocumentStore, RetrievalResult};

/// Number of passages retrieved per query
pub const DEFAULT_TOP_K: usize = 3;

/// One question asked under one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub question: String,
    pub role: String,
}

impl Query {
    pub fn new(question: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            role: role.into(),
        }
    }
}

/// Fetches the top-K passages visible to a role.
///
/// The document store's filter is the only enforcement point; results are
/// returned as the store produced them, without post-filtering.
#[derive(Clone)]
pub struct Retriever {
    store: DocumentStore,
    policy: AccessPolicy,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever with the default K
    pub fn new(store: DocumentStore, policy: AccessPolicy) -> Self {
        Self::with_top_k(store, policy, DEFAULT_TOP_K)
    }

    /// Create with a custom K (must be positive; checked by the store)
    pub fn with_top_k(store: DocumentStore, policy: AccessPolicy, top_k: usize) -> Self {
        Self {
            store,
            policy,
            top_k,
        }
    }

    /// Retrieve passages for `query.question` visible to `query.role`
    pub async fn retrieve(&self, query: &Query) -> Result<RetrievalResult> {
        let filter = self.policy.filter_for(&query.role);
        self.store
            .search(&query.question, self.top_k, filter.as_ref())
            .await
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RagError;
    use crate::models::Embedder;
    use crate::store::{Passage, SnapshotIndex, ACCESS_LEVEL_KEY};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    /// Every query embeds to the same vector
    struct ConstantEmbedder;

    #[async_trait]
    impl Embedder for ConstantEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(RagError::EmbeddingError("quota exceeded".to_string()))
        }
    }

    fn tagged(id: &str, level: &str) -> Passage {
        let mut metadata = BTreeMap::new();
        metadata.insert(ACCESS_LEVEL_KEY.to_string(), level.to_string());
        Passage::new(id, id, metadata)
    }

    fn retriever(embedder: Arc<dyn Embedder>) -> Retriever {
        let index = SnapshotIndex::from_entries(vec![
            (tagged("hr-1", "hr"), vec![1.0, 0.0]),
            (tagged("fin-1", "finance"), vec![0.9, 0.1]),
            (tagged("hr-2", "hr"), vec![0.8, 0.2]),
            (tagged("eng-1", "engineering"), vec![0.7, 0.3]),
            (tagged("hr-3", "hr"), vec![0.6, 0.4]),
            (tagged("hr-4", "hr"), vec![0.5, 0.5]),
        ])
        .unwrap();
        Retriever::new(
            DocumentStore::new(embedder, Arc::new(index)),
            AccessPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_role_sees_only_its_tag() {
        let retriever = retriever(Arc::new(ConstantEmbedder));
        let result = retriever.retrieve(&Query::new("anything", "hr")).await.unwrap();

        let ids: Vec<&str> = result.iter().map(|s| s.passage.id.as_str()).collect();
        assert_eq!(ids, vec!["hr-1", "hr-2", "hr-3"]);
    }

    #[tokio::test]
    async fn test_privileged_role_is_unfiltered() {
        let retriever = retriever(Arc::new(ConstantEmbedder));
        let result = retriever.retrieve(&Query::new("anything", "C-Level")).await.unwrap();

        let ids: Vec<&str> = result.iter().map(|s| s.passage.id.as_str()).collect();
        assert_eq!(ids, vec!["hr-1", "fin-1", "hr-2"]);
    }

    #[tokio::test]
    async fn test_role_without_passages_gets_empty_result() {
        let retriever = retriever(Arc::new(ConstantEmbedder));
        let result = retriever.retrieve(&Query::new("anything", "marketing")).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let retriever = retriever(Arc::new(FailingEmbedder));
        let err = retriever.retrieve(&Query::new("anything", "hr")).await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingError(_)));
    }

    #[test]
    fn test_default_top_k() {
        let retriever = retriever(Arc::new(ConstantEmbedder));
        assert_eq!(retriever.top_k, 3);
    }
}
