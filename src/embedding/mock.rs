use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::error::EmbeddingError;
use super::feature_hash::HashingEmbedder;
use super::provider::EmbeddingProvider;

/// Test embedder with pinned vectors, call counting and failure injection.
///
/// Texts without a pinned vector fall back to the feature-hashing embedder of the same
/// dimension.
#[derive(Debug)]
pub struct MockEmbedder {
    model_id: String,
    fallback: HashingEmbedder,
    pinned: RwLock<HashMap<String, Vec<f32>>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            model_id: "mock-embedder".to_string(),
            fallback: HashingEmbedder::new(dimension.max(1)).unwrap_or_default(),
            pinned: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_model_id(mut self, model_id: &str) -> Self {
        self.model_id = model_id.to_string();
        self
    }

    /// Returns `vector` whenever exactly `text` is embedded.
    pub fn pin(&self, text: &str, vector: Vec<f32>) {
        self.pinned.write().insert(text.to_string(), vector);
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    /// Number of texts embedded so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }
}

impl EmbeddingProvider for MockEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.fallback.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.failing.load(Ordering::Acquire) {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock embedder set to fail".to_string(),
            });
        }
        self.calls.fetch_add(1, Ordering::AcqRel);

        if let Some(vector) = self.pinned.read().get(text) {
            return Ok(vector.clone());
        }
        self.fallback.embed_sync(text)
    }
}
