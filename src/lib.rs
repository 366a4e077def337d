//! rolerag - role-scoped retrieval-augmented question answering
//!
//! Answers natural-language questions over a private document corpus while
//! enforcing per-role visibility on which passages may contribute.
//!
//! # Architecture
//!
//! - **store**: embedded passages + filtered similarity search
//! - **rag**: access policy, retriever, context assembly, answer generation
//! - **service**: startup wiring and readiness state
//! - **server**: HTTP transport (`/`, `/query`)
//! - **models**: `Embedder` / `Completer` capabilities (Ollama, candle)

pub mod errors;
pub use errors::{RagError, Result};

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod rag;
pub mod server;
pub mod service;
pub mod store;
