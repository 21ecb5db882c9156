//! Ingestion pipeline: corpus records in, embedded entries out.
//!
//! Records are embedded in batches and written through a [`Catalog`](crate::store::Catalog).
//! Entries whose reference and text are already stored are skipped, so re-running an
//! incremental ingestion over an unchanged corpus embeds nothing.

pub mod config;
pub mod corpus;
pub mod error;
pub mod pipeline;
pub mod types;


pub use config::IngestConfig;
pub use corpus::{
    CorpusRecord, CorpusSource, JsonCorpus, JsonLinesCorpus, RecordIter, VecCorpus,
    corpus_from_path,
};
pub use error::{IngestError, IngestResult};
pub use pipeline::IngestionPipeline;
pub use types::{CancelHandle, IngestMode, IngestReport};
