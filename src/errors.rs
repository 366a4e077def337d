//! Error types for rolerag
//!
//! Startup failures (`StoreUnavailable`, `ConfigError`) keep the service from
//! becoming ready. Everything raised while serving a request is converted at
//! the orchestrator boundary into a single response carrying the cause.

use thiserror::Error;

/// Main error type for the retrieval pipeline
#[derive(Error, Debug)]
pub enum RagError {
    /// The persisted vector index could not be opened
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    /// The embedding capability failed while embedding a query
    #[error("Embedding failed: {0}")]
    EmbeddingError(String),

    /// The completion capability failed while generating an answer
    #[error("Answer generation failed: {0}")]
    GenerationError(String),

    /// A request arrived before startup completed
    #[error("Service not ready: {0}")]
    NotReady(String),

    /// Malformed request (e.g. blank question)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Pipeline lifecycle violations
    #[error("Invalid state transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Request exceeded its deadline
    #[error("Request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

impl RagError {
    /// HTTP status code reported to callers for this error
    pub fn status_code(&self) -> u16 {
        match self {
            RagError::NotReady(_) => 503,
            RagError::InvalidQuery(_) => 400,
            _ => 500,
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RagError>;

/// Convert anyhow errors to RagError
impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        RagError::Generic(err.to_string())
    }
}
