//! Shared corpus fixtures and wiring for integration tests.

use std::sync::Arc;

use verity::embedding::{EmbeddingProvider, HashingEmbedder};
use verity::index::{MemoryIndex, SimilarityIndex};
use verity::ingest::{CancelHandle, IngestConfig, IngestMode, IngestionPipeline, VecCorpus};
use verity::resolver::{MatchResolver, ResolverConfig};
use verity::store::{Catalog, EntryStore, MemoryEntryStore};

pub const DIM: usize = 384;

pub const VERSES: &[(&str, &str)] = &[
    ("John 3:16", "For God so loved the world, that he gave his only begotten Son"),
    ("John 11:35", "Jesus wept."),
    ("Genesis 1:1", "In the beginning God created the heaven and the earth."),
    ("Psalm 23:1", "The Lord is my shepherd; I shall not want."),
    ("Romans 6:23", "For the wages of sin is death; but the gift of God is eternal life"),
    ("Proverbs 3:5", "Trust in the Lord with all thine heart; and lean not unto thine own understanding."),
    ("Philippians 4:13", "I can do all things through Christ which strengtheneth me."),
    ("Matthew 5:9", "Blessed are the peacemakers: for they shall be called the children of God."),
    ("Exodus 20:13", "Thou shalt not kill."),
    ("1 Corinthians 13:4", "Charity suffereth long, and is kind; charity envieth not"),
];

pub const SAMPLE_QUERIES: &[&str] = &[
    "For God so loved the world",
    "Jesus wept",
    "the Lord is my shepherd",
    "I can do all things through Christ",
    "blessed are the peacemakers",
    "To be or not to be",
    "Charity is kind",
];

pub fn verse_corpus() -> VecCorpus {
    VecCorpus::from_pairs(VERSES.iter().copied())
}

/// Store, index, pipeline and resolver over in-memory backends.
pub struct Harness<E, S = MemoryEntryStore, I = MemoryIndex> {
    pub embedder: Arc<E>,
    pub catalog: Arc<Catalog<S, I>>,
    pub pipeline: IngestionPipeline<E, S, I>,
    pub resolver: MatchResolver<E, I>,
}

impl<E, S, I> Harness<E, S, I>
where
    E: EmbeddingProvider,
    S: EntryStore,
    I: SimilarityIndex,
{
    pub fn with_parts(embedder: E, store: S, index: I, resolver_config: ResolverConfig) -> Self {
        let embedder = Arc::new(embedder);
        let index = Arc::new(index);
        let catalog = Arc::new(Catalog::new(Arc::new(store), Arc::clone(&index)));
        let pipeline = IngestionPipeline::new(
            Arc::clone(&embedder),
            Arc::clone(&catalog),
            IngestConfig::default().batch_size(4),
        )
        .expect("pipeline");
        let resolver =
            MatchResolver::new(Arc::clone(&embedder), index, resolver_config).expect("resolver");

        Self {
            embedder,
            catalog,
            pipeline,
            resolver,
        }
    }

    pub async fn ingest_full(&self, corpus: &VecCorpus) {
        self.pipeline
            .ingest(corpus, IngestMode::Full, &CancelHandle::new())
            .await
            .expect("ingest");
    }
}

pub fn hashing_harness(resolver_config: ResolverConfig) -> Harness<HashingEmbedder> {
    Harness::with_parts(
        HashingEmbedder::new(DIM).expect("embedder"),
        MemoryEntryStore::new(DIM),
        MemoryIndex::new(DIM),
        resolver_config,
    )
}

/// Unit vector along `axis`.
pub fn axis(dim: usize, axis: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[axis] = 1.0;
    v
}
