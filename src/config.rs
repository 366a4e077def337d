//! Configuration management for rolerag
//!
//! TOML-based configuration with defaults and validation.
//! Location: ~/.rolerag/config.toml, or the path given with `--config`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{RagError, Result};

/// Complete configuration for the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub ollama: OllamaConfig,
    pub embedder: EmbedderConfig,
    pub store: StoreConfig,
    pub retrieval: RetrievalConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request deadline in seconds; 0 disables it
    pub request_timeout_secs: u64,
}

/// Ollama connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub chat_model: String,
    pub embedding_model: String,
    pub timeout_secs: u64,
}

/// Which embedding capability backs query embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderBackend {
    Ollama,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub backend: EmbedderBackend,
    /// HuggingFace model id used by the local backend
    pub local_model: String,
}

/// Which persisted vector index the document store opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Snapshot,
    Qdrant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Snapshot file path (snapshot backend)
    pub path: String,
    pub qdrant_url: String,
    pub collection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub privileged_role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing-subscriber filter directive; `RUST_LOG` takes precedence
    pub filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 120,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
            chat_model: "qwen2.5:7b-instruct".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            backend: EmbedderBackend::Ollama,
            local_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Snapshot,
            path: "~/.rolerag/index.json".to_string(),
            qdrant_url: "http://localhost:6334".to_string(),
            collection: "rbac_rag_store".to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: crate::rag::DEFAULT_TOP_K,
            privileged_role: crate::rag::PRIVILEGED_ROLE.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file. Not validated here; callers
    /// validate after applying command-line overrides.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RagError::ConfigError(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| RagError::ConfigError(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Load from ~/.rolerag/config.toml when present, built-in defaults otherwise
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".rolerag").join("config.toml");
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(RagError::ConfigError(
                "retrieval.top_k must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.privileged_role.trim().is_empty() {
            return Err(RagError::ConfigError(
                "retrieval.privileged_role must not be empty".to_string(),
            ));
        }

        if self.server.port == 0 || self.ollama.port == 0 {
            return Err(RagError::ConfigError("ports must be non-zero".to_string()));
        }

        if self.ollama.chat_model.is_empty() || self.ollama.embedding_model.is_empty() {
            return Err(RagError::ConfigError(
                "ollama model names must not be empty".to_string(),
            ));
        }

        if self.store.backend == StoreBackend::Qdrant && self.store.collection.is_empty() {
            return Err(RagError::ConfigError(
                "store.collection is required for the qdrant backend".to_string(),
            ));
        }

        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| RagError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Snapshot index path with `~` expanded
    pub fn store_path(&self) -> PathBuf {
        Self::expand_path(&self.store.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.ollama.port, 11434);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.privileged_role, "c-level");
        assert_eq!(config.store.backend, StoreBackend::Snapshot);
        assert_eq!(config.store.collection, "rbac_rag_store");
        assert_eq!(config.embedder.local_model, "sentence-transformers/all-MiniLM-L6-v2");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_top_k() {
        let mut config = Config::default();
        config.retrieval.top_k = 0;
        assert!(matches!(config.validate(), Err(RagError::ConfigError(_))));
    }

    #[test]
    fn test_config_validation_blank_privileged_role() {
        let mut config = Config::default();
        config.retrieval.privileged_role = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[store]\nbackend = \"qdrant\"\ncollection = \"docs\"\n\n[server]\nport = 9000"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Qdrant);
        assert_eq!(config.store.collection, "docs");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.retrieval.top_k, 3);
    }

    #[test]
    fn test_invalid_file_value_can_be_overridden() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 0").unwrap();

        let mut config = Config::load(Some(file.path())).unwrap();
        assert!(config.validate().is_err());

        crate::cli::apply_serve_overrides(&mut config, None, Some(9000), None);
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = Config::load(Some(Path::new("/nonexistent/rolerag.toml")));
        assert!(matches!(result, Err(RagError::ConfigError(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[retrieval]"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.ollama.chat_model, config.ollama.chat_model);
    }

    #[test]
    fn test_urls() {
        let config = Config::default();
        assert_eq!(config.ollama_url(), "http://127.0.0.1:11434");
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn test_expand_path_without_tilde() {
        assert_eq!(Config::expand_path("/tmp/index.json"), PathBuf::from("/tmp/index.json"));
    }
}
