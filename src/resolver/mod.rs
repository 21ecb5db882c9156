//! Match resolver: turns query text into a [`Verdict`].
//!
//! The resolver embeds the query, asks the similarity index for the `top_k` nearest entries and
//! applies the threshold to the best one. It holds no locks across awaits and never retries;
//! embedding and index failures surface as [`ResolveError`].

pub mod config;
pub mod error;
pub mod types;


pub use config::ResolverConfig;
pub use error::{ResolveError, ResolveResult};
pub use types::{Candidate, MatchConfidence, ScoreMapping, Verdict};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::constants::validate_embedding_dim;
use crate::embedding::EmbeddingProvider;
use crate::index::SimilarityIndex;

pub struct MatchResolver<E, I> {
    embedder: Arc<E>,
    index: Arc<I>,
    config: ResolverConfig,
}

impl<E, I> std::fmt::Debug for MatchResolver<E, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: EmbeddingProvider, I: SimilarityIndex> MatchResolver<E, I> {
    /// Fails if `config` is invalid or the embedder and index disagree on dimension.
    pub fn new(embedder: Arc<E>, index: Arc<I>, config: ResolverConfig) -> ResolveResult<Self> {
        config.validate()?;
        validate_embedding_dim(embedder.dimension(), index.dimension()).map_err(|e| {
            ResolveError::InvalidConfig {
                reason: format!("embedder and index disagree: {}", e),
            }
        })?;

        Ok(Self {
            embedder,
            index,
            config,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), top_k = self.config.top_k))]
    pub async fn resolve(&self, text: &str) -> ResolveResult<Verdict> {
        let embedding = self.embedder.embed(text).await?;
        self.resolve_embedding(&embedding).await
    }

    /// Resolves a precomputed query embedding.
    pub async fn resolve_embedding(&self, embedding: &[f32]) -> ResolveResult<Verdict> {
        let results = self.index.query(embedding, self.config.top_k).await?;

        if results.is_empty() {
            debug!("Index returned no candidates");
            return Ok(Verdict::no_candidates());
        }

        let mapping = self.config.score_mapping;
        let candidates: Vec<Candidate> = results
            .into_iter()
            .map(|point| Candidate {
                entry_id: point.id,
                score: mapping.apply(point.score),
                reference: point.payload.reference,
                text: point.payload.text,
            })
            .collect();

        let best = &candidates[0];
        let score = best.score;
        let matched = score >= self.config.threshold;
        let confidence =
            MatchConfidence::classify(score, self.config.threshold, self.config.possible_threshold);

        debug!(
            score,
            matched,
            reference = %best.reference,
            candidates = candidates.len(),
            "Resolved query"
        );

        Ok(Verdict {
            matched,
            score,
            reference: best.reference.clone(),
            text: best.text.clone(),
            entry_id: Some(best.entry_id),
            confidence,
            candidates,
        })
    }

    /// Like [`resolve`](Self::resolve) but gives up after `deadline`. No partial verdict is
    /// returned on timeout.
    pub async fn resolve_within(&self, text: &str, deadline: Duration) -> ResolveResult<Verdict> {
        tokio::time::timeout(deadline, self.resolve(text))
            .await
            .map_err(|_| ResolveError::Timeout { after: deadline })?
    }

    /// [`resolve_within`](Self::resolve_within) using the configured query timeout.
    pub async fn resolve_with_timeout(&self, text: &str) -> ResolveResult<Verdict> {
        self.resolve_within(text, self.config.query_timeout).await
    }
}
