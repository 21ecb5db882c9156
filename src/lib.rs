//! Verity library crate (used by the `verity` binary and integration tests).
//!
//! Answers "does this quote come from a known corpus, and which entry?" by comparing an
//! embedding of the quote against embeddings of every corpus entry.
//!
//! # Public API Surface
//!
//! ## Build side
//! - [`IngestionPipeline`] - reads a [`CorpusSource`], embeds records, writes them through a
//!   [`Catalog`]
//! - [`EntryStore`] ([`MemoryEntryStore`], [`DiskEntryStore`]) - canonical entries
//! - [`SimilarityIndex`] ([`MemoryIndex`], [`QdrantIndex`]) - cosine k-NN
//!
//! ## Query side
//! - [`MatchResolver`] - text in, [`Verdict`] out
//! - [`EmbeddingProvider`] ([`HashingEmbedder`], [`HttpEmbedder`]) - text to vector
//!
//! ## Configuration
//! - [`Config`] - `VERITY_*` environment variables, converted into the per-component configs
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod entry;
pub mod hashing;
pub mod index;
pub mod ingest;
pub mod resolver;
pub mod store;

pub use config::{Config, ConfigError};
pub use constants::{DimConfig, DimValidationError, validate_embedding_dim};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use embedding::{
    EmbedderBackend, EmbeddingError, EmbeddingProvider, HashingEmbedder, HttpEmbedder,
    HttpEmbedderConfig,
};
pub use entry::{Entry, EntryId, Payload, ValidationError};
pub use hashing::{hash_reference, hash_text, hash_to_u64};
#[cfg(any(test, feature = "mock"))]
pub use index::MockIndex;
pub use index::{
    IndexBackend, IndexError, IndexPoint, MemoryIndex, QdrantIndex, QdrantIndexConfig,
    ScoredPoint, SimilarityIndex, cosine_similarity,
};
pub use ingest::{
    CancelHandle, CorpusRecord, CorpusSource, IngestConfig, IngestError, IngestMode,
    IngestReport, IngestionPipeline, JsonCorpus, JsonLinesCorpus, VecCorpus,
};
pub use resolver::{
    Candidate, MatchConfidence, MatchResolver, ResolveError, ResolverConfig, ScoreMapping,
    Verdict,
};
pub use store::{
    Catalog, CatalogError, DiskEntryStore, EntryStore, MemoryEntryStore, StoreError,
    StoreManifest,
};
