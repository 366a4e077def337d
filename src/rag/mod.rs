// Role-scoped RAG (Retrieval-Augmented Generation) pipeline
//
// Turns a (question, role) pair into a filtered set of passages, assembles
// them into grounded context, and produces an attributed answer.
//
// Components:
// - Access Policy: role -> retrieval filter
// - Retriever: policy-filtered similarity search
// - Context Builder: passages -> context block + citations
// - Answer Generator: context + question -> completion
// - Pipeline: end-to-end request handling

pub mod context;
pub mod generator;
pub mod pipeline;
pub mod policy;
pub mod retrieval;

// Re-export key types
pub use context::{AssembledContext, ContextAssembler};
pub use generator::{AnswerGenerator, FALLBACK_ANSWER};
pub use pipeline::{Answer, RagPipeline};
pub use policy::{AccessPolicy, PRIVILEGED_ROLE};
pub use retrieval::{Query, Retriever, DEFAULT_TOP_K};
