use thiserror::Error;

use crate::entry::ValidationError;

#[derive(Debug, Error)]
/// Errors returned by similarity index operations.
pub enum IndexError {
    /// Could not connect to the vector database.
    #[error("failed to connect to vector database at '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Collection creation failed.
    #[error("failed to create collection '{collection}': {message}")]
    CreateCollectionFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Collection does not exist.
    #[error("collection not found: {collection}")]
    CollectionNotFound {
        /// Collection name.
        collection: String,
    },

    /// Upsert failed.
    #[error("failed to upsert points to '{collection}': {message}")]
    UpsertFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Search failed.
    #[error("failed to search in '{collection}': {message}")]
    SearchFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Delete failed.
    #[error("failed to delete points from '{collection}': {message}")]
    DeleteFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Point count failed.
    #[error("failed to count points in '{collection}': {message}")]
    CountFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// A point was rejected before reaching the index.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Query vector cannot be scored (zero magnitude, wrong dimension, non-finite).
    #[error("invalid query: {reason}")]
    InvalidQuery {
        /// Why the query was rejected.
        reason: String,
    },
}

impl IndexError {
    /// Returns `true` for degenerate query vectors.
    pub fn is_invalid_query(&self) -> bool {
        matches!(self, IndexError::InvalidQuery { .. })
    }
}
