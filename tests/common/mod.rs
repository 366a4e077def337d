//! Shared test doubles and corpus fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use rolerag::models::{CompletionOptions, Completer, Embedder};
use rolerag::rag::{AccessPolicy, AnswerGenerator, RagPipeline, Retriever};
use rolerag::store::{DocumentStore, Passage, SnapshotIndex};
use rolerag::{RagError, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fixed vocabulary; each word is one embedding dimension
pub const VOCABULARY: [&str; 10] = [
    "vacation", "days", "salary", "budget", "deploy", "server", "campaign", "brand", "policy",
    "revenue",
];

/// Bag-of-words vector over `VOCABULARY`, plus a constant bias dimension
pub fn vectorize(text: &str) -> Vec<f32> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut vector: Vec<f32> = VOCABULARY
        .iter()
        .map(|term| words.iter().filter(|w| w.starts_with(term)).count() as f32)
        .collect();
    vector.push(0.1);
    vector
}

/// Deterministic embedder backed by `vectorize`
#[derive(Default)]
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vectorize(text))
    }
}

/// Embedder whose upstream is down
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::EmbeddingError("embedding service returned 429".to_string()))
    }
}

/// Answers with the first context line, or the fallback when context is empty
pub struct GroundedCompleter;

#[async_trait]
impl Completer for GroundedCompleter {
    async fn complete(&self, prompt: &str, _options: CompletionOptions) -> Result<String> {
        let context = prompt
            .split("Context:\n")
            .nth(1)
            .and_then(|rest| rest.split("\n\nQuestion:").next())
            .unwrap_or("");

        match context.lines().next() {
            Some(line) if !line.trim().is_empty() => Ok(line.to_string()),
            _ => Ok("I don't know".to_string()),
        }
    }
}

/// Completer whose upstream is down
pub struct FailingCompleter;

#[async_trait]
impl Completer for FailingCompleter {
    async fn complete(&self, _prompt: &str, _options: CompletionOptions) -> Result<String> {
        Err(RagError::GenerationError("completion service unavailable".to_string()))
    }
}

/// Passage with the usual metadata fields; `None` leaves a field out
pub fn passage(
    id: &str,
    content: &str,
    access_level: &str,
    file_name: Option<&str>,
    page_no: Option<u32>,
) -> Passage {
    let mut metadata = BTreeMap::new();
    metadata.insert("access_level".to_string(), access_level.to_string());
    if let Some(file) = file_name {
        metadata.insert("file_name".to_string(), file.to_string());
    }
    if let Some(page) = page_no {
        metadata.insert("page_no".to_string(), page.to_string());
    }
    Passage::new(id, content, metadata)
}

/// In-memory index embedding each passage with `vectorize`
pub fn index_of(passages: Vec<Passage>) -> SnapshotIndex {
    let entries = passages
        .into_iter()
        .map(|p| {
            let vector = vectorize(&p.content);
            (p, vector)
        })
        .collect();
    SnapshotIndex::from_entries(entries).expect("consistent dimensions")
}

/// Demo corpus spanning several departments
pub fn company_corpus() -> Vec<Passage> {
    vec![
        passage("hr-1", "Vacation policy: 20 days/year.", "hr", Some("policy.pdf"), Some(1)),
        passage("hr-2", "Salary bands are reviewed every year.", "hr", Some("comp.pdf"), Some(4)),
        passage("fin-1", "Quarterly budget and revenue forecast.", "finance", Some("q3.xlsx"), Some(2)),
        passage("eng-1", "Deploy the server with the release checklist.", "engineering", Some("runbook.md"), None),
        passage("mkt-1", "Campaign brand guidelines.", "marketing", None, Some(9)),
        passage("all-1", "Office policy: badges are required.", "general", Some("handbook.pdf"), Some(3)),
    ]
}

pub fn store_of(passages: Vec<Passage>, embedder: Arc<dyn Embedder>) -> DocumentStore {
    DocumentStore::new(embedder, Arc::new(index_of(passages)))
}

pub fn retriever_of(passages: Vec<Passage>) -> Retriever {
    Retriever::new(
        store_of(passages, Arc::new(KeywordEmbedder::default())),
        AccessPolicy::default(),
    )
}

pub fn pipeline_with(
    passages: Vec<Passage>,
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn Completer>,
) -> RagPipeline {
    RagPipeline::new(
        Retriever::new(store_of(passages, embedder), AccessPolicy::default()),
        AnswerGenerator::new(completer),
    )
}

pub fn company_pipeline() -> RagPipeline {
    pipeline_with(
        company_corpus(),
        Arc::new(KeywordEmbedder::default()),
        Arc::new(GroundedCompleter),
    )
}
