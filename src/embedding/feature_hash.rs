//! Deterministic feature-hashing embedder.
//!
//! Lowercased word unigrams and bigrams are hashed into `D` signed buckets and the result is
//! L2-normalized. Texts that share wording score high; unrelated texts land near zero. No model
//! files are needed, which makes it the default provider for local runs and tests.

use tracing::debug;

use super::error::EmbeddingError;
use super::provider::{EmbeddingProvider, check_input};
use crate::constants::DEFAULT_EMBEDDING_DIM;

pub const HASHING_MODEL_ID: &str = "verity-feature-hash-v1";

pub const DEFAULT_MAX_INPUT_CHARS: usize = 8_192;

const UNIGRAM_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    max_input_chars: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_EMBEDDING_DIM,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "dimension must be > 0".to_string(),
            });
        }
        Ok(Self {
            dimension,
            ..Default::default()
        })
    }

    pub fn max_input_chars(mut self, limit: usize) -> Self {
        self.max_input_chars = limit;
        self
    }

    /// Synchronous form of [`EmbeddingProvider::embed`].
    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        check_input(text, self.max_input_chars)?;

        let words = tokenize(text);
        if words.is_empty() {
            return Err(EmbeddingError::InvalidInput {
                reason: "text contains no word characters".to_string(),
            });
        }

        let mut embedding = vec![0.0f32; self.dimension];
        for word in &words {
            self.accumulate(&mut embedding, word.as_bytes(), UNIGRAM_WEIGHT);
        }
        for pair in words.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            self.accumulate(&mut embedding, bigram.as_bytes(), BIGRAM_WEIGHT);
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            // Every feature cancelled out; fall back to the first unigram's bucket.
            let (bucket, _) = self.bucket(words[0].as_bytes());
            embedding[bucket] = 1.0;
        } else {
            for x in &mut embedding {
                *x /= norm;
            }
        }

        debug!(
            text_len = text.len(),
            tokens = words.len(),
            "Generated feature-hash embedding"
        );

        Ok(embedding)
    }

    fn accumulate(&self, embedding: &mut [f32], feature: &[u8], weight: f32) {
        let (bucket, sign) = self.bucket(feature);
        embedding[bucket] += sign * weight;
    }

    fn bucket(&self, feature: &[u8]) -> (usize, f32) {
        let hash = crate::hashing::hash_to_u64(feature);
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
        (bucket, sign)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

impl EmbeddingProvider for HashingEmbedder {
    fn model_id(&self) -> &str {
        HASHING_MODEL_ID
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_sync(text)
    }
}
