use std::future::Future;

use super::error::EmbeddingError;
use super::feature_hash::HashingEmbedder;
use super::http::HttpEmbedder;

/// Maps text to a fixed-length vector.
///
/// Model identity and dimension are a fixed pair: changing either invalidates every stored
/// embedding. Implementations must be deterministic for a given text.
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the model (and version) producing the vectors.
    fn model_id(&self) -> &str;

    /// Output dimension `D`.
    fn dimension(&self) -> usize;

    /// Embeds a single text.
    fn embed(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<f32>, EmbeddingError>> + Send;

    /// Embeds a batch of texts, preserving order.
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send {
        async move {
            let mut embeddings = Vec::with_capacity(texts.len());
            for text in texts {
                embeddings.push(self.embed(text).await?);
            }
            Ok(embeddings)
        }
    }
}

/// Rejects text no provider should embed.
pub(crate) fn check_input(text: &str, max_input_chars: usize) -> Result<(), EmbeddingError> {
    if text.trim().is_empty() {
        return Err(EmbeddingError::InvalidInput {
            reason: "text is empty".to_string(),
        });
    }

    let chars = text.chars().count();
    if chars > max_input_chars {
        return Err(EmbeddingError::InvalidInput {
            reason: format!("text has {} characters, limit is {}", chars, max_input_chars),
        });
    }

    Ok(())
}

/// Concrete provider chosen at start-up.
#[derive(Debug)]
pub enum EmbedderBackend {
    /// Local deterministic feature-hashing embedder.
    Hashing(HashingEmbedder),
    /// Remote embedding service.
    Http(HttpEmbedder),
}

impl EmbeddingProvider for EmbedderBackend {
    fn model_id(&self) -> &str {
        match self {
            EmbedderBackend::Hashing(e) => e.model_id(),
            EmbedderBackend::Http(e) => e.model_id(),
        }
    }

    fn dimension(&self) -> usize {
        match self {
            EmbedderBackend::Hashing(e) => e.dimension(),
            EmbedderBackend::Http(e) => e.dimension(),
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match self {
            EmbedderBackend::Hashing(e) => e.embed(text).await,
            EmbedderBackend::Http(e) => e.embed(text).await,
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match self {
            EmbedderBackend::Hashing(e) => e.embed_batch(texts).await,
            EmbedderBackend::Http(e) => e.embed_batch(texts).await,
        }
    }
}
