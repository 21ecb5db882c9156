use std::path::PathBuf;

use thiserror::Error;

use crate::entry::ValidationError;

/// Errors returned by entry store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Entry rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored file could not be decoded.
    #[error("corrupt store file {path}: {reason}")]
    Corrupt {
        /// File that failed to decode.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
