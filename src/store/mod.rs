//! Entry store: the canonical corpus and the source of truth for (re)indexing.
//!
//! Stores are synchronous and internally locked; many readers proceed in parallel and writes
//! replace whole entries. [`Catalog`] couples a store with a similarity index so that both are
//! mutated in one logical operation.

pub mod catalog;
pub mod disk;
pub mod error;
pub mod memory;

#[cfg(test)]
mod tests;

pub use catalog::{Catalog, CatalogError, CatalogResult};
pub use disk::DiskEntryStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryEntryStore;

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, EntryId, ValidationError};

/// Page size used by [`EntryStore::all`] when callers have no preference.
pub const DEFAULT_SCAN_PAGE: usize = 256;

/// Records which embedding model produced the stored vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreManifest {
    pub model_id: String,
    pub dimension: usize,
}

impl StoreManifest {
    pub fn new(model_id: impl Into<String>, dimension: usize) -> Self {
        Self {
            model_id: model_id.into(),
            dimension,
        }
    }
}

/// Canonical storage of corpus entries.
pub trait EntryStore: Send + Sync {
    /// Embedding dimension every stored entry must have.
    fn dimension(&self) -> usize;

    /// Inserts or replaces the entry with `entry.id`.
    ///
    /// Rejects entries that fail [`Entry::validate`] and entries whose id is already held by a
    /// different reference.
    fn upsert(&self, entry: Entry) -> StoreResult<()>;

    /// Absence is `Ok(None)`, never an error.
    fn get(&self, id: EntryId) -> StoreResult<Option<Entry>>;

    /// Up to `limit` entries with ids strictly greater than `after`, in ascending id order.
    fn scan(&self, after: Option<EntryId>, limit: usize) -> StoreResult<Vec<Entry>>;

    fn count(&self) -> StoreResult<usize>;

    /// Removes an entry. Returns `true` if it existed.
    fn delete(&self, id: EntryId) -> StoreResult<bool>;

    fn clear(&self) -> StoreResult<()>;

    fn manifest(&self) -> StoreResult<Option<StoreManifest>>;

    fn set_manifest(&self, manifest: StoreManifest) -> StoreResult<()>;

    /// Lazy, restartable pass over every entry in id order.
    fn all(&self, page_size: usize) -> EntryCursor<'_, Self> {
        EntryCursor::new(self, page_size)
    }
}

/// Shared upsert checks for store implementations.
pub(crate) fn check_upsert(
    entry: &Entry,
    existing: Option<&str>,
    dimension: usize,
) -> Result<(), ValidationError> {
    entry.validate(dimension)?;
    if let Some(existing) = existing
        && existing != entry.reference
    {
        return Err(ValidationError::IdCollision {
            id: entry.id,
            existing: existing.to_string(),
            incoming: entry.reference.clone(),
        });
    }
    Ok(())
}

/// Page-at-a-time iterator over an [`EntryStore`].
///
/// Only one page is held in memory. Entries written while the cursor is live are seen if their
/// id sorts after the cursor position.
pub struct EntryCursor<'a, S: ?Sized> {
    store: &'a S,
    page_size: usize,
    after: Option<EntryId>,
    page: std::vec::IntoIter<Entry>,
    exhausted: bool,
}

impl<'a, S: EntryStore + ?Sized> EntryCursor<'a, S> {
    pub fn new(store: &'a S, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            after: None,
            page: Vec::new().into_iter(),
            exhausted: false,
        }
    }

    /// Returns the next page of entries, or `None` once the store is exhausted.
    pub fn next_page(&mut self) -> Option<StoreResult<Vec<Entry>>> {
        if self.exhausted {
            return None;
        }

        match self.store.scan(self.after, self.page_size) {
            Ok(page) => {
                if page.len() < self.page_size {
                    self.exhausted = true;
                }
                match page.last() {
                    Some(last) => {
                        self.after = Some(last.id);
                        Some(Ok(page))
                    }
                    None => None,
                }
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: EntryStore + ?Sized> Iterator for EntryCursor<'_, S> {
    type Item = StoreResult<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.page.next() {
                return Some(Ok(entry));
            }
            match self.next_page()? {
                Ok(page) => self.page = page.into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
