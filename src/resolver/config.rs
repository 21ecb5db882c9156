use std::time::Duration;

use crate::constants::{
    DEFAULT_POSSIBLE_THRESHOLD, DEFAULT_QUERY_TIMEOUT_MS, DEFAULT_SIMILARITY_THRESHOLD,
    DEFAULT_TOP_K,
};

use super::error::{ResolveError, ResolveResult};
use super::types::ScoreMapping;

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Inclusive match threshold on the mapped score.
    pub threshold: f32,
    /// Lower bound of the "possible match" band.
    pub possible_threshold: f32,
    pub top_k: usize,
    pub score_mapping: ScoreMapping,
    /// Deadline applied by [`MatchResolver::resolve_within`](super::MatchResolver::resolve_within)
    /// callers that use the configured default.
    pub query_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            possible_threshold: DEFAULT_POSSIBLE_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            score_mapping: ScoreMapping::default(),
            query_timeout: Duration::from_millis(DEFAULT_QUERY_TIMEOUT_MS),
        }
    }
}

impl ResolverConfig {
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn possible_threshold(mut self, threshold: f32) -> Self {
        self.possible_threshold = threshold;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn score_mapping(mut self, mapping: ScoreMapping) -> Self {
        self.score_mapping = mapping;
        self
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn validate(&self) -> ResolveResult<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ResolveError::InvalidConfig {
                reason: format!("threshold must be in [0, 1], got {}", self.threshold),
            });
        }
        if !(0.0..=self.threshold).contains(&self.possible_threshold) {
            return Err(ResolveError::InvalidConfig {
                reason: format!(
                    "possible_threshold must be in [0, threshold], got {}",
                    self.possible_threshold
                ),
            });
        }
        if self.top_k == 0 {
            return Err(ResolveError::InvalidConfig {
                reason: "top_k must be > 0".to_string(),
            });
        }
        if self.query_timeout.is_zero() {
            return Err(ResolveError::InvalidConfig {
                reason: "query_timeout must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
