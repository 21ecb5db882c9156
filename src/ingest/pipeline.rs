use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry as MapEntry;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::constants::validate_embedding_dim;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::entry::{Entry, EntryId, ValidationError};
use crate::hashing::hash_text;
use crate::index::SimilarityIndex;
use crate::store::{Catalog, EntryStore, StoreManifest};

use super::config::IngestConfig;
use super::corpus::{CorpusRecord, CorpusSource};
use super::error::{IngestError, IngestResult};
use super::types::{CancelHandle, IngestMode, IngestReport};

/// Reads corpus records, embeds them and writes them through a [`Catalog`].
pub struct IngestionPipeline<E, S, I> {
    embedder: Arc<E>,
    catalog: Arc<Catalog<S, I>>,
    config: IngestConfig,
}

impl<E, S, I> std::fmt::Debug for IngestionPipeline<E, S, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Result of the validation pass over a corpus.
struct CorpusSummary {
    records: usize,
    duplicates: usize,
}

impl<E, S, I> IngestionPipeline<E, S, I>
where
    E: EmbeddingProvider,
    S: EntryStore,
    I: SimilarityIndex,
{
    pub fn new(
        embedder: Arc<E>,
        catalog: Arc<Catalog<S, I>>,
        config: IngestConfig,
    ) -> IngestResult<Self> {
        config.validate()?;
        validate_embedding_dim(embedder.dimension(), catalog.dimension()).map_err(|e| {
            IngestError::InvalidConfig {
                reason: format!("embedder and entry store disagree: {}", e),
            }
        })?;

        Ok(Self {
            embedder,
            catalog,
            config,
        })
    }

    pub fn catalog(&self) -> &Arc<Catalog<S, I>> {
        &self.catalog
    }

    fn current_manifest(&self) -> StoreManifest {
        StoreManifest::new(self.embedder.model_id(), self.embedder.dimension())
    }

    fn check_manifest(&self) -> IngestResult<Option<StoreManifest>> {
        let current = self.current_manifest();
        match self.catalog.manifest()? {
            Some(stored) if stored != current => Err(IngestError::ModelMismatch {
                stored: stored.model_id,
                stored_dimension: stored.dimension,
                current: current.model_id,
                current_dimension: current.dimension,
            }),
            Some(_) => Ok(None),
            None => Ok(Some(current)),
        }
    }

    /// Ingests every record of `source`.
    ///
    /// The corpus is read twice: a validation pass that rejects conflicting records before
    /// anything is written, then the embedding pass. Cancellation is honoured between batches;
    /// batches already written stay written.
    #[instrument(skip(self, source, cancel), fields(source = %source.name(), mode = ?mode))]
    pub async fn ingest<C: CorpusSource + ?Sized>(
        &self,
        source: &C,
        mode: IngestMode,
        cancel: &CancelHandle,
    ) -> IngestResult<IngestReport> {
        let summary = self.validate_corpus(source)?;
        let mut report = IngestReport {
            records: summary.records,
            duplicates: summary.duplicates,
            ..Default::default()
        };

        self.catalog.index().ensure_ready().await?;

        match mode {
            IngestMode::Full => {
                self.catalog.reset(self.current_manifest()).await?;
            }
            IngestMode::Incremental => {
                if let Some(manifest) = self.check_manifest()? {
                    self.catalog.set_manifest(manifest).await?;
                }
            }
        }

        info!(
            records = report.records,
            duplicates = report.duplicates,
            batch_size = self.config.batch_size,
            "Starting ingestion"
        );

        let mut seen: HashSet<EntryId> = HashSet::with_capacity(summary.records);
        let mut batch: Vec<CorpusRecord> = Vec::with_capacity(self.config.batch_size);
        let mut done = 0usize;

        for record in source.open()? {
            let record = record?;
            let id = EntryId::for_reference(&record.reference);
            if !seen.insert(id) {
                continue;
            }

            batch.push(record);
            if batch.len() == self.config.batch_size {
                if cancel.is_cancelled() {
                    report.cancelled = true;
                    break;
                }
                done += batch.len();
                self.process_batch(std::mem::take(&mut batch), &mut report)
                    .await?;
                self.log_progress(done, report.records);
            }
        }

        if !batch.is_empty() && !report.cancelled {
            if cancel.is_cancelled() {
                report.cancelled = true;
            } else {
                done += batch.len();
                self.process_batch(batch, &mut report).await?;
                self.log_progress(done, report.records);
            }
        }

        if report.cancelled {
            warn!(
                done,
                total = report.records,
                "Ingestion cancelled between batches"
            );
        } else {
            info!(
                embedded = report.embedded,
                skipped = report.skipped,
                batches = report.batches,
                "Ingestion complete"
            );
        }

        Ok(report)
    }

    /// Rebuilds the similarity index from the entry store without re-embedding.
    pub async fn reindex_from_store(&self) -> IngestResult<usize> {
        if self.catalog.count()? > 0 {
            self.check_manifest()?;
        }
        Ok(self.catalog.rebuild_index(self.config.batch_size).await?)
    }

    /// Counts distinct records and rejects blank or conflicting ones, independent of record order.
    fn validate_corpus<C: CorpusSource + ?Sized>(&self, source: &C) -> IngestResult<CorpusSummary> {
        let mut fingerprints: HashMap<EntryId, (String, [u8; 32])> =
            HashMap::with_capacity(source.len_hint().unwrap_or(0));
        let mut duplicates = 0usize;

        for record in source.open()? {
            let record = record?;
            if record.reference.trim().is_empty() {
                return Err(ValidationError::EmptyReference.into());
            }
            if record.text.trim().is_empty() {
                return Err(ValidationError::EmptyText {
                    reference: record.reference,
                }
                .into());
            }

            let id = EntryId::for_reference(&record.reference);
            let fingerprint = hash_text(&record.text);

            match fingerprints.entry(id) {
                MapEntry::Vacant(slot) => {
                    slot.insert((record.reference, fingerprint));
                }
                MapEntry::Occupied(slot) => {
                    let (reference, existing) = slot.get();
                    if *reference != record.reference {
                        return Err(ValidationError::IdCollision {
                            id,
                            existing: reference.clone(),
                            incoming: record.reference,
                        }
                        .into());
                    }
                    if *existing != fingerprint {
                        return Err(ValidationError::ConflictingRecord {
                            reference: record.reference,
                        }
                        .into());
                    }
                    duplicates += 1;
                }
            }
        }

        Ok(CorpusSummary {
            records: fingerprints.len(),
            duplicates,
        })
    }

    #[instrument(skip(self, batch, report), fields(batch = report.batches + 1, size = batch.len()))]
    async fn process_batch(
        &self,
        batch: Vec<CorpusRecord>,
        report: &mut IngestReport,
    ) -> IngestResult<()> {
        let mut pending = Vec::with_capacity(batch.len());
        for record in batch {
            let id = EntryId::for_reference(&record.reference);
            match self.catalog.get(id)? {
                Some(stored) if stored.has_content(&record.reference, &record.text) => {
                    report.skipped += 1;
                }
                _ => pending.push(record),
            }
        }

        report.batches += 1;
        if pending.is_empty() {
            debug!("Batch already up to date");
            return Ok(());
        }

        let texts: Vec<String> = pending.iter().map(|r| r.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != pending.len() {
            return Err(EmbeddingError::InvalidResponse {
                reason: format!(
                    "expected {} embeddings, got {}",
                    pending.len(),
                    embeddings.len()
                ),
            }
            .into());
        }

        let entries: Vec<Entry> = pending
            .into_iter()
            .zip(embeddings)
            .map(|(record, embedding)| Entry::new(record.reference, record.text, embedding))
            .collect();

        let count = entries.len();
        self.catalog.upsert_batch(entries).await?;
        report.embedded += count;

        debug!(embedded = count, "Batch written");
        Ok(())
    }

    fn log_progress(&self, done: usize, total: usize) {
        let percent = if total == 0 {
            100.0
        } else {
            (done as f64 * 1000.0 / total as f64).round() / 10.0
        };
        info!(done, total, percent, "Ingestion progress");
    }
}
