use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Text the provider refuses to embed (empty, no tokens, oversized).
    #[error("invalid embedding input: {reason}")]
    InvalidInput { reason: String },

    #[error("embedding request to '{url}' failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("embedding service returned an invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("invalid embedder configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        EmbeddingError::RequestFailed {
            url,
            reason: err.to_string(),
        }
    }
}

impl EmbeddingError {
    /// Returns `true` if the same request may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EmbeddingError::RequestFailed { .. }
                | EmbeddingError::InvalidResponse { .. }
                | EmbeddingError::InferenceFailed { .. }
        )
    }
}
