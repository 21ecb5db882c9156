use std::future::Future;

use crate::entry::{EntryId, Payload};

use super::error::IndexError;
use super::memory::MemoryIndex;
use super::model::{IndexPoint, ScoredPoint};
use super::qdrant::QdrantIndex;

/// Queryable structure over entry embeddings.
///
/// Contract shared by every implementation:
/// - upserts are idempotent and replace vector and payload of a point together;
/// - deletes of absent ids are no-ops;
/// - `query` returns at most `k` results ordered by descending raw cosine score
///   (`[-1, 1]`), ties broken by ascending id;
/// - an empty index answers with an empty result; a zero-magnitude query is
///   [`IndexError::InvalidQuery`].
pub trait SimilarityIndex: Send + Sync {
    /// Vector dimension the index was built for.
    fn dimension(&self) -> usize;

    /// Prepares backing storage (creates the collection if missing).
    fn ensure_ready(&self) -> impl Future<Output = Result<(), IndexError>> + Send;

    /// Inserts or replaces points.
    fn upsert_points(
        &self,
        points: Vec<IndexPoint>,
    ) -> impl Future<Output = Result<(), IndexError>> + Send;

    /// Removes points; unknown ids are ignored.
    fn delete_points(
        &self,
        ids: &[EntryId],
    ) -> impl Future<Output = Result<(), IndexError>> + Send;

    /// k-nearest neighbours by cosine similarity.
    fn query(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> impl Future<Output = Result<Vec<ScoredPoint>, IndexError>> + Send;

    /// Number of live points.
    fn count(&self) -> impl Future<Output = Result<usize, IndexError>> + Send;

    /// Removes every point.
    fn clear(&self) -> impl Future<Output = Result<(), IndexError>> + Send;

    /// Single-point upsert.
    fn upsert(
        &self,
        id: EntryId,
        embedding: Vec<f32>,
        payload: Payload,
    ) -> impl Future<Output = Result<(), IndexError>> + Send {
        self.upsert_points(vec![IndexPoint::new(id, embedding, payload)])
    }

    /// Single-point delete.
    fn delete(&self, id: EntryId) -> impl Future<Output = Result<(), IndexError>> + Send {
        async move { self.delete_points(&[id]).await }
    }
}

/// Index implementation chosen at start-up.
pub enum IndexBackend {
    /// Brute-force in-process index.
    Memory(MemoryIndex),
    /// Qdrant collection.
    Qdrant(QdrantIndex),
}

impl std::fmt::Debug for IndexBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexBackend::Memory(index) => f.debug_tuple("Memory").field(index).finish(),
            IndexBackend::Qdrant(index) => f.debug_tuple("Qdrant").field(index).finish(),
        }
    }
}

impl SimilarityIndex for IndexBackend {
    fn dimension(&self) -> usize {
        match self {
            IndexBackend::Memory(index) => index.dimension(),
            IndexBackend::Qdrant(index) => index.dimension(),
        }
    }

    async fn ensure_ready(&self) -> Result<(), IndexError> {
        match self {
            IndexBackend::Memory(index) => index.ensure_ready().await,
            IndexBackend::Qdrant(index) => index.ensure_ready().await,
        }
    }

    async fn upsert_points(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        match self {
            IndexBackend::Memory(index) => index.upsert_points(points).await,
            IndexBackend::Qdrant(index) => index.upsert_points(points).await,
        }
    }

    async fn delete_points(&self, ids: &[EntryId]) -> Result<(), IndexError> {
        match self {
            IndexBackend::Memory(index) => index.delete_points(ids).await,
            IndexBackend::Qdrant(index) => index.delete_points(ids).await,
        }
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredPoint>, IndexError> {
        match self {
            IndexBackend::Memory(index) => index.query(embedding, k).await,
            IndexBackend::Qdrant(index) => index.query(embedding, k).await,
        }
    }

    async fn count(&self) -> Result<usize, IndexError> {
        match self {
            IndexBackend::Memory(index) => index.count().await,
            IndexBackend::Qdrant(index) => index.count().await,
        }
    }

    async fn clear(&self) -> Result<(), IndexError> {
        match self {
            IndexBackend::Memory(index) => index.clear().await,
            IndexBackend::Qdrant(index) => index.clear().await,
        }
    }
}
