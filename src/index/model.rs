use std::cmp::Ordering;

use crate::entry::{Entry, EntryId, Payload};

use super::IndexError;

/// Materialized form of an [`Entry`] inside a similarity index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPoint {
    pub id: EntryId,
    pub embedding: Vec<f32>,
    pub payload: Payload,
}

impl IndexPoint {
    pub fn new(id: EntryId, embedding: Vec<f32>, payload: Payload) -> Self {
        Self {
            id,
            embedding,
            payload,
        }
    }
}

impl From<&Entry> for IndexPoint {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            embedding: entry.embedding.clone(),
            payload: entry.payload(),
        }
    }
}

impl From<Entry> for IndexPoint {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            payload: Payload::new(entry.reference, entry.text),
            embedding: entry.embedding,
        }
    }
}

/// One query result. `score` is raw cosine similarity in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub id: EntryId,
    pub score: f32,
    pub payload: Payload,
}

/// Result order: descending score, then ascending id.
pub fn rank_order(a: &ScoredPoint, b: &ScoredPoint) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteConsistency {
    /// Wait for the operation to be fully indexed and searchable.
    /// Slow, but ensures read-after-write consistency.
    /// Maps to `wait=true`.
    Strong,
    /// Return immediately after the server acknowledges receipt.
    /// Fast, but data may not be searchable immediately.
    /// Maps to `wait=false`.
    Eventual,
}

impl From<WriteConsistency> for bool {
    fn from(c: WriteConsistency) -> bool {
        matches!(c, WriteConsistency::Strong)
    }
}

/// Rejects query vectors that cannot be scored against a `dimension`-sized index.
pub fn validate_query(query: &[f32], dimension: usize) -> Result<(), IndexError> {
    if query.len() != dimension {
        return Err(IndexError::InvalidQuery {
            reason: format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                dimension
            ),
        });
    }

    if query.iter().any(|v| !v.is_finite()) {
        return Err(IndexError::InvalidQuery {
            reason: "query contains non-finite values".to_string(),
        });
    }

    if query.iter().all(|v| *v == 0.0) {
        return Err(IndexError::InvalidQuery {
            reason: "query vector has zero magnitude".to_string(),
        });
    }

    Ok(())
}

/// Sum of squares accumulated in f64.
pub(crate) fn squared_norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum()
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}

/// Cosine similarity from precomputed squared norms, clamped to `[-1, 1]`.
///
/// Identical vectors score exactly `1.0`: the dot product and both squared norms are summed in
/// the same order, and `sqrt(s * s) == s` in IEEE arithmetic.
pub(crate) fn cosine_from_parts(dot: f64, norm_sq_a: f64, norm_sq_b: f64) -> f32 {
    let denom = (norm_sq_a * norm_sq_b).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0) as f32
}

/// Cosine similarity `dot(a, b) / (|a| * |b|)`; `0.0` when undefined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    cosine_from_parts(dot(a, b), squared_norm(a), squared_norm(b))
}
