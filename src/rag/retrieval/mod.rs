// Retrieval Engine Module
pub mod engine;

pub use engine::{Query, Retriever, DEFAULT_TOP_K};
