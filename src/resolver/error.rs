use std::time::Duration;

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::index::IndexError;

/// Errors returned by the match resolver.
///
/// A failed resolve is never reported as a non-matching verdict.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index query failed: {0}")]
    Index(IndexError),

    /// The query embedding cannot be scored (zero magnitude, wrong dimension).
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("resolve did not complete within {after:?}")]
    Timeout { after: Duration },

    #[error("invalid resolver configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<IndexError> for ResolveError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::InvalidQuery { reason } => ResolveError::InvalidQuery { reason },
            other => ResolveError::Index(other),
        }
    }
}

impl ResolveError {
    /// Returns `true` if retrying the same query may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ResolveError::Embedding(e) => e.is_transient(),
            ResolveError::Index(_) | ResolveError::Timeout { .. } => true,
            ResolveError::InvalidQuery { .. } | ResolveError::InvalidConfig { .. } => false,
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
