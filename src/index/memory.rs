//! Brute-force in-process index.
//!
//! Every query scores all points; a bounded heap keeps the best `k`. Points are stored as
//! `Arc`s and swapped whole under the write lock, so a concurrent reader sees either the old or
//! the new point, never a mix of one's vector and the other's payload.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::entry::{EntryId, Payload, validate_embedding};

use super::backend::SimilarityIndex;
use super::error::IndexError;
use super::model::{
    IndexPoint, ScoredPoint, cosine_from_parts, dot, squared_norm, validate_query,
};

#[derive(Debug)]
struct StoredPoint {
    embedding: Vec<f32>,
    norm_sq: f64,
    payload: Payload,
}

struct Ranked {
    score: f32,
    id: EntryId,
    point: Arc<StoredPoint>,
}

// Greater means better: higher score, then lower id.
impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

pub struct MemoryIndex {
    dimension: usize,
    points: RwLock<HashMap<EntryId, Arc<StoredPoint>>>,
}

impl std::fmt::Debug for MemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIndex")
            .field("dimension", &self.dimension)
            .field("points", &self.points.read().len())
            .finish()
    }
}

impl MemoryIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            points: RwLock::new(HashMap::new()),
        }
    }

    /// Number of points (synchronous).
    pub fn len(&self) -> usize {
        self.points.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.read().is_empty()
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.points.read().contains_key(&id)
    }

    /// Synchronous form of [`SimilarityIndex::query`].
    pub fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredPoint>, IndexError> {
        validate_query(embedding, self.dimension)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_norm_sq = squared_norm(embedding);

        let heap = {
            let points = self.points.read();
            let mut heap: BinaryHeap<Reverse<Ranked>> =
                BinaryHeap::with_capacity(k.min(points.len()).saturating_add(1));
            for (&id, point) in points.iter() {
                let score = cosine_from_parts(
                    dot(embedding, &point.embedding),
                    query_norm_sq,
                    point.norm_sq,
                );
                heap.push(Reverse(Ranked {
                    score,
                    id,
                    point: Arc::clone(point),
                }));
                if heap.len() > k {
                    heap.pop();
                }
            }
            heap
        };

        let mut ranked: Vec<Ranked> = heap.into_iter().map(|Reverse(r)| r).collect();
        ranked.sort_by(|a, b| b.cmp(a));

        Ok(ranked
            .into_iter()
            .map(|r| ScoredPoint {
                id: r.id,
                score: r.score,
                payload: r.point.payload.clone(),
            })
            .collect())
    }

    #[cfg(test)]
    pub(crate) fn insert_for_test(&self, point: IndexPoint) {
        if let Err(e) = self.insert_all(vec![point]) {
            panic!("test insert failed: {e}");
        }
    }

    fn insert_all(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        for point in &points {
            validate_embedding(point.id, &point.embedding, self.dimension)?;
        }

        let stored: Vec<(EntryId, Arc<StoredPoint>)> = points
            .into_iter()
            .map(|p| {
                let norm_sq = squared_norm(&p.embedding);
                (
                    p.id,
                    Arc::new(StoredPoint {
                        embedding: p.embedding,
                        norm_sq,
                        payload: p.payload,
                    }),
                )
            })
            .collect();

        let count = stored.len();
        let mut map = self.points.write();
        for (id, point) in stored {
            map.insert(id, point);
        }
        drop(map);

        debug!(count, "Upserted points into memory index");
        Ok(())
    }
}

impl SimilarityIndex for MemoryIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn ensure_ready(&self) -> Result<(), IndexError> {
        Ok(())
    }

    async fn upsert_points(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        self.insert_all(points)
    }

    async fn delete_points(&self, ids: &[EntryId]) -> Result<(), IndexError> {
        let mut map = self.points.write();
        for id in ids {
            map.remove(id);
        }
        Ok(())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredPoint>, IndexError> {
        self.search(embedding, k)
    }

    async fn count(&self) -> Result<usize, IndexError> {
        Ok(self.len())
    }

    async fn clear(&self) -> Result<(), IndexError> {
        self.points.write().clear();
        Ok(())
    }
}
