//! Similarity index: k-nearest-neighbour retrieval by cosine similarity.
//!
//! [`SimilarityIndex`] is the capability interface; [`MemoryIndex`] (brute force) and
//! [`QdrantIndex`] (vector database) implement it, and [`IndexBackend`] selects one at runtime.

pub mod backend;
pub mod error;
pub mod memory;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;
pub mod qdrant;


pub use backend::{IndexBackend, SimilarityIndex};
pub use error::IndexError;
pub use memory::MemoryIndex;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockIndex;
pub use model::{
    IndexPoint, ScoredPoint, WriteConsistency, cosine_similarity, rank_order, validate_query,
};
pub use qdrant::{DEFAULT_QDRANT_URL, DEFAULT_TIE_OVERFETCH, QdrantIndex, QdrantIndexConfig};
