//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `VERITY_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DimConfig,
    DEFAULT_BATCH_SIZE, DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_DIM, DEFAULT_MODEL_ID,
    DEFAULT_POSSIBLE_THRESHOLD, DEFAULT_QUERY_TIMEOUT_MS, DEFAULT_SIMILARITY_THRESHOLD,
    DEFAULT_TOP_K,
};
use crate::embedding::HttpEmbedderConfig;
use crate::index::QdrantIndexConfig;
use crate::ingest::IngestConfig;
use crate::resolver::{ResolverConfig, ScoreMapping};

/// Process configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `VERITY_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Embedding dimension shared by provider, store and index. Default: `384`.
    pub embedding_dim: usize,

    /// Inclusive match threshold on the `[0, 1]` verdict score. Default: `0.7`.
    pub similarity_threshold: f32,

    /// Lower bound of the "possible match" band. Default: `0.6`.
    pub possible_threshold: f32,

    /// Candidates requested per query. Default: `1`.
    pub top_k: usize,

    /// Records embedded per ingestion batch. Default: `50`.
    pub batch_size: usize,

    /// Directory for the entry store. Default: `./.data`.
    pub storage_path: PathBuf,

    /// Qdrant endpoint. Unset selects the in-memory index.
    pub qdrant_url: Option<String>,

    /// Qdrant collection name. Default: `verity_entries`.
    pub collection_name: String,

    /// Text-embedding service endpoint. Unset selects the local hashing embedder.
    pub embedding_url: Option<String>,

    /// Model id reported by the HTTP embedder. Default: `all-MiniLM-L6-v2`.
    pub model_id: String,

    pub score_mapping: ScoreMapping,

    /// Per-query deadline. Default: 5s.
    pub query_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            possible_threshold: DEFAULT_POSSIBLE_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            batch_size: DEFAULT_BATCH_SIZE,
            storage_path: PathBuf::from("./.data"),
            qdrant_url: None,
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            embedding_url: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            score_mapping: ScoreMapping::default(),
            query_timeout: Duration::from_millis(DEFAULT_QUERY_TIMEOUT_MS),
        }
    }
}

impl Config {
    const ENV_EMBEDDING_DIM: &'static str = "VERITY_EMBEDDING_DIM";
    const ENV_SIMILARITY_THRESHOLD: &'static str = "VERITY_SIMILARITY_THRESHOLD";
    const ENV_POSSIBLE_THRESHOLD: &'static str = "VERITY_POSSIBLE_THRESHOLD";
    const ENV_TOP_K: &'static str = "VERITY_TOP_K";
    const ENV_BATCH_SIZE: &'static str = "VERITY_BATCH_SIZE";
    const ENV_STORAGE_PATH: &'static str = "VERITY_STORAGE_PATH";
    const ENV_QDRANT_URL: &'static str = "VERITY_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "VERITY_COLLECTION";
    const ENV_EMBEDDING_URL: &'static str = "VERITY_EMBEDDING_URL";
    const ENV_MODEL_ID: &'static str = "VERITY_MODEL_ID";
    const ENV_SCORE_MAPPING: &'static str = "VERITY_SCORE_MAPPING";
    const ENV_QUERY_TIMEOUT_MS: &'static str = "VERITY_QUERY_TIMEOUT_MS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let embedding_dim = Self::parse_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?;
        let similarity_threshold =
            Self::parse_from_env(Self::ENV_SIMILARITY_THRESHOLD, defaults.similarity_threshold)?;
        let possible_threshold =
            Self::parse_from_env(Self::ENV_POSSIBLE_THRESHOLD, defaults.possible_threshold)?;
        let top_k = Self::parse_from_env(Self::ENV_TOP_K, defaults.top_k)?;
        let batch_size = Self::parse_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size)?;
        let storage_path = Self::parse_path_from_env(Self::ENV_STORAGE_PATH, defaults.storage_path);
        let qdrant_url = Self::parse_optional_string_from_env(Self::ENV_QDRANT_URL);
        let collection_name =
            Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection_name);
        let embedding_url = Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_URL);
        let model_id = Self::parse_string_from_env(Self::ENV_MODEL_ID, defaults.model_id);
        let score_mapping = Self::parse_from_env(Self::ENV_SCORE_MAPPING, defaults.score_mapping)?;
        let query_timeout_ms: u64 = Self::parse_from_env(
            Self::ENV_QUERY_TIMEOUT_MS,
            defaults.query_timeout.as_millis() as u64,
        )?;

        Ok(Self {
            embedding_dim,
            similarity_threshold,
            possible_threshold,
            top_k,
            batch_size,
            storage_path,
            qdrant_url,
            collection_name,
            embedding_url,
            model_id,
            score_mapping,
            query_timeout: Duration::from_millis(query_timeout_ms),
        })
    }

    /// Checks invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        DimConfig::new(self.embedding_dim)
            .validate()
            .map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })?;

        if self.storage_path.exists() && !self.storage_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.storage_path.clone(),
            });
        }

        self.resolver_config()
            .validate()
            .map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })?;
        self.ingest_config()
            .validate()
            .map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })?;

        if let Some(http) = self.http_embedder_config() {
            http.validate().map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::default()
            .threshold(self.similarity_threshold)
            .possible_threshold(self.possible_threshold)
            .top_k(self.top_k)
            .score_mapping(self.score_mapping)
            .query_timeout(self.query_timeout)
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig::default().batch_size(self.batch_size)
    }

    /// `None` when no Qdrant URL is configured.
    pub fn qdrant_config(&self) -> Option<QdrantIndexConfig> {
        self.qdrant_url.as_deref().map(|url| {
            QdrantIndexConfig::new(url)
                .collection_name(&self.collection_name)
                .dimension(self.embedding_dim)
        })
    }

    /// `None` when no embedding service URL is configured.
    pub fn http_embedder_config(&self) -> Option<HttpEmbedderConfig> {
        self.embedding_url.as_deref().map(|url| {
            HttpEmbedderConfig::new(url)
                .model_id(&self.model_id)
                .dimension(self.embedding_dim)
        })
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name: var_name,
                value: value.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }
}
