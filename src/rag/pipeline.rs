// End-to-end RAG pipeline: retrieve -> assemble -> generate
use tracing::debug;

use crate::errors::{RagError, Result};
use crate::rag::context::{AssembledContext, ContextAssembler};
use crate::rag::generator::AnswerGenerator;
use crate::rag::retrieval::{Query, Retriever};

/// Characters of each passage shown in debug logs
const LOG_PREVIEW_CHARS: usize = 200;

/// Attributed answer to one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    /// Citation lines, in retrieval order
    pub sources: Vec<String>,
}

impl Answer {
    pub fn sources_text(&self) -> String {
        self.sources.join("\n")
    }
}

/// Stateless request handler shared by every request
#[derive(Clone)]
pub struct RagPipeline {
    retriever: Retriever,
    assembler: ContextAssembler,
    generator: AnswerGenerator,
}

impl RagPipeline {
    pub fn new(retriever: Retriever, generator: AnswerGenerator) -> Self {
        Self {
            retriever,
            assembler: ContextAssembler::new(),
            generator,
        }
    }

    /// Answer one query under its role
    pub async fn handle(&self, query: &Query) -> Result<Answer> {
        if query.question.trim().is_empty() {
            return Err(RagError::InvalidQuery("question must not be empty".to_string()));
        }

        let result = self.retriever.retrieve(query).await?;

        for (i, scored) in result.iter().enumerate() {
            let preview: String = scored.passage.content.chars().take(LOG_PREVIEW_CHARS).collect();
            debug!(
                rank = i + 1,
                score = scored.score,
                metadata = ?scored.passage.metadata,
                "Retrieved passage: {}",
                preview
            );
        }

        let AssembledContext { context, sources } = self.assembler.assemble(&result);
        let text = self.generator.generate(&query.question, &context).await?;

        Ok(Answer { text, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompletionOptions, Completer, Embedder};
    use crate::rag::policy::AccessPolicy;
    use crate::store::{DocumentStore, Passage, SnapshotIndex};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ConstantEmbedder;

    #[async_trait]
    impl Embedder for ConstantEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
    }

    /// Answers from context when present, otherwise the fallback
    #[derive(Default)]
    struct ContextEchoCompleter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Completer for ContextEchoCompleter {
        async fn complete(&self, prompt: &str, _options: CompletionOptions) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("Context:\n\n\nQuestion:") {
                Ok("I don't know".to_string())
            } else {
                Ok("Found it in the context.".to_string())
            }
        }
    }

    fn pipeline(completer: Arc<ContextEchoCompleter>) -> RagPipeline {
        let mut metadata = BTreeMap::new();
        metadata.insert("access_level".to_string(), "hr".to_string());
        metadata.insert("file_name".to_string(), "policy.pdf".to_string());
        metadata.insert("page_no".to_string(), "1".to_string());

        let index = SnapshotIndex::from_entries(vec![(
            Passage::new("p1", "Vacation policy: 20 days/year.", metadata),
            vec![1.0, 0.0],
        )])
        .unwrap();

        let store = DocumentStore::new(Arc::new(ConstantEmbedder), Arc::new(index));
        RagPipeline::new(
            Retriever::new(store, AccessPolicy::default()),
            AnswerGenerator::new(completer),
        )
    }

    #[tokio::test]
    async fn test_handle_attributes_sources() {
        let pipeline = pipeline(Arc::new(ContextEchoCompleter::default()));
        let answer = pipeline.handle(&Query::new("vacation days?", "hr")).await.unwrap();

        assert_eq!(answer.text, "Found it in the context.");
        assert_eq!(answer.sources, vec!["File: policy.pdf, Page: 1"]);
        assert_eq!(answer.sources_text(), "File: policy.pdf, Page: 1");
    }

    #[tokio::test]
    async fn test_handle_empty_result_still_generates() {
        let completer = Arc::new(ContextEchoCompleter::default());
        let pipeline = pipeline(completer.clone());
        let answer = pipeline.handle(&Query::new("vacation days?", "engineer")).await.unwrap();

        assert_eq!(answer.text, "I don't know");
        assert!(answer.sources.is_empty());
        assert_eq!(completer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_question_rejected_before_any_work() {
        let completer = Arc::new(ContextEchoCompleter::default());
        let pipeline = pipeline(completer.clone());
        let err = pipeline.handle(&Query::new("   ", "hr")).await.unwrap_err();

        assert!(matches!(err, RagError::InvalidQuery(_)));
        assert_eq!(completer.calls.load(Ordering::SeqCst), 0);
    }
}
