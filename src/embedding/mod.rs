//! Embedding providers.
//!
//! - [`EmbeddingProvider`] is the capability the rest of the crate consumes.
//! - [`HashingEmbedder`] is a deterministic local provider (no model files).
//! - [`HttpEmbedder`] calls a remote embedding service.

mod error;
/// Feature-hashing embedder.
pub mod feature_hash;
/// Remote embedding service client.
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod provider;


pub use error::EmbeddingError;
pub use feature_hash::{HASHING_MODEL_ID, HashingEmbedder};
pub use http::{DEFAULT_EMBEDDING_URL, HttpEmbedder, HttpEmbedderConfig};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use provider::{EmbedderBackend, EmbeddingProvider};
