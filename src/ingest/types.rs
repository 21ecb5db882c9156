use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IngestMode {
    /// Embed only records that are new or whose text changed.
    #[default]
    Incremental,
    /// Clear store and index, then embed every record.
    Full,
}

/// Counters for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Distinct records read from the corpus.
    pub records: usize,
    pub embedded: usize,
    /// Records already stored with identical reference and text.
    pub skipped: usize,
    /// Repeated references with identical text, collapsed into one record.
    pub duplicates: usize,
    pub batches: usize,
    pub cancelled: bool,
}

/// Cooperative cancellation flag shared between the caller and a running ingestion.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
