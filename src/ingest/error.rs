use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::entry::ValidationError;
use crate::index::IndexError;
use crate::store::{CatalogError, StoreError};

/// Errors returned by the ingestion pipeline.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A record or entry was rejected. Nothing from the offending batch was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index write failed: {0}")]
    Index(#[from] IndexError),

    #[error("entry store failed: {0}")]
    Store(#[from] StoreError),

    /// The corpus could not be read or parsed.
    #[error("corpus {source_name}: {reason}")]
    Corpus { source_name: String, reason: String },

    /// The store holds vectors from a different embedding model.
    #[error(
        "entry store was built with model '{stored}' (dim {stored_dimension}), provider is '{current}' (dim {current_dimension}); run a full re-index"
    )]
    ModelMismatch {
        stored: String,
        stored_dimension: usize,
        current: String,
        current_dimension: usize,
    },

    #[error("invalid ingest configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<CatalogError> for IngestError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Store(StoreError::Validation(e)) => IngestError::Validation(e),
            CatalogError::Store(e) => IngestError::Store(e),
            CatalogError::Index(e) => IngestError::Index(e),
        }
    }
}

pub type IngestResult<T> = Result<T, IngestError>;
