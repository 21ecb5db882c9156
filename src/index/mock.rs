use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::entry::EntryId;

use super::backend::SimilarityIndex;
use super::error::IndexError;
use super::memory::MemoryIndex;
use super::model::{IndexPoint, ScoredPoint};

/// In-memory index with failure injection and artificial latency.
#[derive(Debug)]
pub struct MockIndex {
    inner: MemoryIndex,
    fail_queries: AtomicBool,
    fail_upserts: AtomicBool,
    query_delay: Mutex<Option<Duration>>,
    queries: AtomicUsize,
}

impl MockIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            inner: MemoryIndex::new(dimension),
            fail_queries: AtomicBool::new(false),
            fail_upserts: AtomicBool::new(false),
            query_delay: Mutex::new(None),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &MemoryIndex {
        &self.inner
    }

    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::Release);
    }

    pub fn set_fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::Release);
    }

    /// Delays every query by `delay` before answering.
    pub fn set_query_delay(&self, delay: Option<Duration>) {
        *self.query_delay.lock() = delay;
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Acquire)
    }
}

impl SimilarityIndex for MockIndex {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn ensure_ready(&self) -> Result<(), IndexError> {
        Ok(())
    }

    async fn upsert_points(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        if self.fail_upserts.load(Ordering::Acquire) {
            return Err(IndexError::UpsertFailed {
                collection: "mock".to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.inner.upsert_points(points).await
    }

    async fn delete_points(&self, ids: &[EntryId]) -> Result<(), IndexError> {
        self.inner.delete_points(ids).await
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredPoint>, IndexError> {
        self.queries.fetch_add(1, Ordering::AcqRel);

        let delay = *self.query_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_queries.load(Ordering::Acquire) {
            return Err(IndexError::SearchFailed {
                collection: "mock".to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.inner.query(embedding, k).await
    }

    async fn count(&self) -> Result<usize, IndexError> {
        self.inner.count().await
    }

    async fn clear(&self) -> Result<(), IndexError> {
        self.inner.clear().await
    }
}
