//! Cross-cutting, shared constants.
//!
//! # Dimension Invariants
//!
//! The embedding dimension `D` and the model identity are a fixed pair. Every stored entry, every
//! index point and every query vector must agree on `D`. Use [`DimConfig`] to carry the runtime
//! dimension through initialization and [`validate_embedding_dim`] at module boundaries.

/// Output dimension of `all-MiniLM-L6-v2`, the model the reference corpus was embedded with.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

pub const DEFAULT_MODEL_ID: &str = "all-MiniLM-L6-v2";

/// Minimum rescaled similarity for a verdict to count as a match (inclusive).
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.70;

/// Lower band below the match threshold reported as a "possible" match.
pub const DEFAULT_POSSIBLE_THRESHOLD: f32 = 0.60;

pub const DEFAULT_TOP_K: usize = 1;

pub const DEFAULT_BATCH_SIZE: usize = 50;

pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;

pub const DEFAULT_COLLECTION_NAME: &str = "verity_entries";

/// Runtime dimension configuration for components that must agree on vector size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimConfig {
    /// The embedding vector dimension (number of floats).
    pub embedding_dim: usize,
}

impl Default for DimConfig {
    fn default() -> Self {
        Self {
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl DimConfig {
    pub fn new(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }

    /// Rejects a zero dimension.
    pub fn validate(&self) -> Result<(), DimValidationError> {
        if self.embedding_dim == 0 {
            return Err(DimValidationError::ZeroDimension);
        }
        Ok(())
    }
}

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use verity::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// let provider_dim = 384;
/// validate_embedding_dim(provider_dim, DEFAULT_EMBEDDING_DIM).unwrap();
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
