use thiserror::Error;

use super::EntryId;

/// Malformed entries and records. Permanent: retrying the same input fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Embedding length does not equal the configured dimension.
    #[error("entry {id}: invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        id: EntryId,
        expected: usize,
        actual: usize,
    },

    /// Embedding contains NaN or infinity.
    #[error("entry {id}: embedding value at position {position} is not finite")]
    NonFiniteEmbedding { id: EntryId, position: usize },

    /// Embedding has zero magnitude (cosine similarity undefined).
    #[error("entry {id}: embedding has zero magnitude")]
    ZeroEmbedding { id: EntryId },

    #[error("entry reference must not be empty")]
    EmptyReference,

    #[error("record '{reference}' has no text to embed")]
    EmptyText { reference: String },

    /// Two different references hashed to the same id.
    #[error("id collision on {id}: '{existing}' already stored, refusing '{incoming}'")]
    IdCollision {
        id: EntryId,
        existing: String,
        incoming: String,
    },

    /// The same reference appeared twice in one corpus with different text.
    #[error("reference '{reference}' appears more than once with different text")]
    ConflictingRecord { reference: String },
}
