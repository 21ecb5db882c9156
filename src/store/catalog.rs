use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::entry::{Entry, EntryId, ValidationError};
use crate::index::{IndexError, IndexPoint, SimilarityIndex};

use super::error::StoreError;
use super::{EntryStore, StoreManifest, check_upsert};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

impl From<ValidationError> for CatalogError {
    fn from(e: ValidationError) -> Self {
        CatalogError::Store(StoreError::Validation(e))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Entry store and similarity index mutated as one.
///
/// Every mutation takes the writer lock, so writes to the same id are applied in call order.
/// Readers go straight to the store or index and never wait on the lock.
///
/// Upserts write the index first and the store second: if the store write fails the entry is
/// absent from the store and the next ingestion re-embeds it instead of skipping it. Deletes go
/// the other way, so a failed index delete leaves at worst an orphaned point that the next
/// [`rebuild_index`](Self::rebuild_index) removes.
pub struct Catalog<S, I> {
    store: Arc<S>,
    index: Arc<I>,
    writer: Mutex<()>,
}

impl<S, I> std::fmt::Debug for Catalog<S, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").finish_non_exhaustive()
    }
}

impl<S: EntryStore, I: SimilarityIndex> Catalog<S, I> {
    pub fn new(store: Arc<S>, index: Arc<I>) -> Self {
        Self {
            store,
            index,
            writer: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn index(&self) -> &Arc<I> {
        &self.index
    }

    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }

    pub fn get(&self, id: EntryId) -> CatalogResult<Option<Entry>> {
        Ok(self.store.get(id)?)
    }

    pub fn count(&self) -> CatalogResult<usize> {
        Ok(self.store.count()?)
    }

    pub fn manifest(&self) -> CatalogResult<Option<StoreManifest>> {
        Ok(self.store.manifest()?)
    }

    pub async fn set_manifest(&self, manifest: StoreManifest) -> CatalogResult<()> {
        let _guard = self.writer.lock().await;
        Ok(self.store.set_manifest(manifest)?)
    }

    pub async fn upsert(&self, entry: Entry) -> CatalogResult<()> {
        self.upsert_batch(vec![entry]).await
    }

    /// Validates every entry, then writes all of them to the index and the store.
    ///
    /// Nothing is written if any entry fails validation, including two entries in the batch that
    /// share an id under different references.
    pub async fn upsert_batch(&self, entries: Vec<Entry>) -> CatalogResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let _guard = self.writer.lock().await;

        let dimension = self.store.dimension();
        let mut claimed: HashMap<EntryId, &str> = HashMap::with_capacity(entries.len());
        for entry in &entries {
            match claimed.get(&entry.id) {
                Some(&earlier) => check_upsert(entry, Some(earlier), dimension)?,
                None => {
                    let existing = self.store.get(entry.id)?.map(|e| e.reference);
                    check_upsert(entry, existing.as_deref(), dimension)?;
                }
            }
            claimed.insert(entry.id, entry.reference.as_str());
        }

        let points: Vec<IndexPoint> = entries.iter().map(IndexPoint::from).collect();
        self.index.upsert_points(points).await?;

        let count = entries.len();
        for entry in entries {
            self.store.upsert(entry)?;
        }

        debug!(count, "Catalog upsert committed");
        Ok(())
    }

    /// Removes an entry from both store and index. Absent ids are a no-op.
    pub async fn delete(&self, id: EntryId) -> CatalogResult<bool> {
        let _guard = self.writer.lock().await;
        let existed = self.store.delete(id)?;
        self.index.delete(id).await?;
        Ok(existed)
    }

    /// Empties store and index and records `manifest` for the vectors that follow.
    pub async fn reset(&self, manifest: StoreManifest) -> CatalogResult<()> {
        let _guard = self.writer.lock().await;
        self.store.clear()?;
        self.index.clear().await?;
        self.store.set_manifest(manifest)?;
        info!("Catalog reset");
        Ok(())
    }

    /// Rebuilds the index from the store without re-embedding. Returns the number of points.
    pub async fn rebuild_index(&self, page_size: usize) -> CatalogResult<usize> {
        let _guard = self.writer.lock().await;

        self.index.ensure_ready().await?;
        self.index.clear().await?;

        let mut cursor = self.store.all(page_size);
        let mut total = 0usize;
        while let Some(page) = cursor.next_page() {
            let page = page?;
            total += page.len();
            let points: Vec<IndexPoint> = page.into_iter().map(IndexPoint::from).collect();
            self.index.upsert_points(points).await?;
        }

        info!(points = total, "Rebuilt index from entry store");
        Ok(total)
    }
}
