use std::collections::BTreeMap;
use std::ops::Bound;

use parking_lot::RwLock;

use crate::entry::{Entry, EntryId};

use super::error::StoreResult;
use super::{EntryStore, StoreManifest, check_upsert};

/// Entry store held entirely in memory, ordered by id.
#[derive(Debug)]
pub struct MemoryEntryStore {
    dimension: usize,
    entries: RwLock<BTreeMap<EntryId, Entry>>,
    manifest: RwLock<Option<StoreManifest>>,
}

impl MemoryEntryStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: RwLock::new(BTreeMap::new()),
            manifest: RwLock::new(None),
        }
    }
}

impl EntryStore for MemoryEntryStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn upsert(&self, entry: Entry) -> StoreResult<()> {
        let mut entries = self.entries.write();
        let existing = entries.get(&entry.id).map(|e| e.reference.as_str());
        check_upsert(&entry, existing, self.dimension)?;
        entries.insert(entry.id, entry);
        Ok(())
    }

    fn get(&self, id: EntryId) -> StoreResult<Option<Entry>> {
        Ok(self.entries.read().get(&id).cloned())
    }

    fn scan(&self, after: Option<EntryId>, limit: usize) -> StoreResult<Vec<Entry>> {
        let lower = match after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        Ok(self
            .entries
            .read()
            .range((lower, Bound::Unbounded))
            .take(limit)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.entries.read().len())
    }

    fn delete(&self, id: EntryId) -> StoreResult<bool> {
        Ok(self.entries.write().remove(&id).is_some())
    }

    fn clear(&self) -> StoreResult<()> {
        self.entries.write().clear();
        Ok(())
    }

    fn manifest(&self) -> StoreResult<Option<StoreManifest>> {
        Ok(self.manifest.read().clone())
    }

    fn set_manifest(&self, manifest: StoreManifest) -> StoreResult<()> {
        *self.manifest.write() = Some(manifest);
        Ok(())
    }
}
