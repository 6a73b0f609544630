//! Configuration for the assistant
//!
//! Settings come from environment variables layered over per-section
//! defaults, and are validated once at startup before anything touches the
//! network.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Main assistant configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// LLM gateway configuration
    pub gateway: GatewayConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Storage configuration
    pub storage: StorageConfig,
}

impl AssistantConfig {
    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            config.gateway.api_key = key;
        }
        if let Ok(model) = std::env::var("MODEL_NAME") {
            config.gateway.model = model;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL_NAME") {
            config.embeddings.model = model;
        }
        if let Some(size) = env_parse::<usize>("CHUNK_SIZE")? {
            config.chunking.chunk_size = size;
        }
        if let Some(overlap) = env_parse::<usize>("CHUNK_OVERLAP")? {
            config.chunking.chunk_overlap = overlap;
        }
        if let Some(top_k) = env_parse::<usize>("TOP_K_RESULTS")? {
            config.retrieval.top_k = top_k;
        }
        if let Ok(dir) = std::env::var("STORAGE_DIR") {
            config.storage.storage_dir = PathBuf::from(dir);
        }
        if let Ok(collection) = std::env::var("COLLECTION_NAME") {
            config.storage.collection = collection;
        }
        if let Ok(host) = std::env::var("SERVER_HOST") {
            config.server.host = host;
        }
        if let Some(port) = env_parse::<u16>("SERVER_PORT")? {
            config.server.port = port;
        }

        Ok(config)
    }

    /// Validate that required settings are present and sane
    pub fn validate(&self) -> Result<()> {
        if self.gateway.api_key.is_empty() {
            return Err(Error::Config(
                "OPENROUTER_API_KEY environment variable is required. \
                 Set it in your environment before starting the assistant."
                    .to_string(),
            ));
        }
        if self.gateway.model.is_empty() {
            return Err(Error::Config("MODEL_NAME must not be empty".to_string()));
        }
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("CHUNK_SIZE must be greater than zero".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(
                "CHUNK_OVERLAP must be smaller than CHUNK_SIZE".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("TOP_K_RESULTS must be greater than zero".to_string()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config(
                "embedding dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse an optional environment variable, mapping parse failures to a
/// configuration error that names the offending variable.
fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// LLM gateway configuration (OpenRouter, OpenAI-compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API key for the gateway
    pub api_key: String,
    /// Gateway base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
    /// Referer header sent for gateway attribution
    pub referer: String,
    /// Title header sent for gateway attribution
    pub title: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-5-mini".to_string(),
            temperature: 0.7,
            timeout_secs: 120,
            max_retries: 2,
            referer: "https://github.com/ibrhr/medirag".to_string(),
            title: "Medirag".to_string(),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "openai/text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
    /// Minimum chunk size (smaller chunks are skipped)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 50,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query
    pub top_k: usize,
    /// Minimum similarity for a chunk to be used (0.0-1.0)
    pub similarity_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.2,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite database files
    pub storage_dir: PathBuf,
    /// Collection name for ingested document chunks
    pub collection: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let storage_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("medirag");

        Self {
            storage_dir,
            collection: "medicine_docs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AssistantConfig {
        let mut config = AssistantConfig::default();
        config.gateway.api_key = "test-key".to_string();
        config
    }

    #[test]
    fn default_values_are_sane() {
        let config = AssistantConfig::default();
        assert_eq!(config.gateway.base_url, "https://openrouter.ai/api/v1");
        assert!(!config.gateway.model.is_empty());
        assert!(config.chunking.chunk_size > 0);
        assert!(config.chunking.chunk_overlap < config.chunking.chunk_size);
        assert!(config.retrieval.top_k > 0);
    }

    #[test]
    fn validate_rejects_missing_api_key() {
        let config = AssistantConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn validate_accepts_api_key() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_chunk_size() {
        let mut config = valid_config();
        config.chunking.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_overlap_at_least_chunk_size() {
        let mut config = valid_config();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_top_k() {
        let mut config = valid_config();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }
}
