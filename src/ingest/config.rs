use crate::constants::DEFAULT_BATCH_SIZE;

use super::error::{IngestError, IngestResult};

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Records embedded and written per batch. Cancellation is checked between batches.
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl IngestConfig {
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> IngestResult<()> {
        if self.batch_size == 0 {
            return Err(IngestError::InvalidConfig {
                reason: "batch_size must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
