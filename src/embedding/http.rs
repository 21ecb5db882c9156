//! Remote embedding provider.
//!
//! Speaks the text-embeddings-inference `/embed` shape: `POST {"inputs": [..]}` answered with a
//! JSON array of vectors in request order.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::error::EmbeddingError;
use super::feature_hash::DEFAULT_MAX_INPUT_CHARS;
use super::provider::{EmbeddingProvider, check_input};
use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_MODEL_ID};

pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:8081/embed";

#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    /// Full endpoint URL, e.g. `http://localhost:8081/embed`.
    pub url: String,
    pub model_id: String,
    pub dimension: usize,
    pub timeout: Duration,
    pub max_input_chars: usize,
}

impl Default for HttpEmbedderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_URL)
    }
}

impl HttpEmbedderConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            dimension: DEFAULT_EMBEDDING_DIM,
            timeout: DEFAULT_EMBEDDING_TIMEOUT,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    pub fn model_id(mut self, model_id: &str) -> Self {
        self.model_id = model_id.to_string();
        self
    }

    pub fn dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.url.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "url is required".to_string(),
            });
        }
        if self.dimension == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "dimension must be > 0".to_string(),
            });
        }
        if self.model_id.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_id is required".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    config: HttpEmbedderConfig,
}

impl HttpEmbedder {
    pub fn new(config: HttpEmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpEmbedderConfig {
        &self.config
    }

    fn check_vectors(
        &self,
        expected_count: usize,
        vectors: &[Vec<f32>],
    ) -> Result<(), EmbeddingError> {
        if vectors.len() != expected_count {
            return Err(EmbeddingError::InvalidResponse {
                reason: format!(
                    "requested {} embeddings, received {}",
                    expected_count,
                    vectors.len()
                ),
            });
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != self.config.dimension) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.config.dimension,
                actual: bad.len(),
            });
        }

        Ok(())
    }
}

impl EmbeddingProvider for HttpEmbedder {
    fn model_id(&self) -> &str {
        &self.config.model_id
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| EmbeddingError::InvalidResponse {
            reason: "empty response".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        for text in texts {
            check_input(text, self.config.max_input_chars)?;
        }

        let response = self
            .client
            .post(&self.config.url)
            .json(&EmbedRequest { inputs: texts })
            .send()
            .await?
            .error_for_status()?;

        let vectors: Vec<Vec<f32>> =
            response
                .json()
                .await
                .map_err(|e| EmbeddingError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        self.check_vectors(texts.len(), &vectors)?;
        debug!(
            count = vectors.len(),
            url = %self.config.url,
            "Remote embeddings received"
        );

        Ok(vectors)
    }
}
