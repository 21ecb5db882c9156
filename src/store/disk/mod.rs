//! Disk-backed entry store (one rkyv file per entry).
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/manifest.json
//! <root>/entries/<id as 16 hex digits>.rkyv
//! ```
//!
//! Every write goes to a `.rkyv.tmp` sibling that is synced and then renamed over the final
//! path, so a crash leaves either the old or the new entry. Leftover temp files are removed on
//! open. The set of live ids is kept in memory for ordered scans.

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::ops::Bound;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rkyv::rancor::Error as RkyvError;
use rkyv::to_bytes;
use rkyv::util::AlignedVec;
use tracing::{debug, info, warn};

use crate::entry::{Entry, EntryId};

use super::error::{StoreError, StoreResult};
use super::{EntryStore, StoreManifest, check_upsert};

const ENTRIES_DIR: &str = "entries";
const MANIFEST_FILE: &str = "manifest.json";
const RKYV_EXTENSION: &str = "rkyv";
const TEMP_EXTENSION: &str = "rkyv.tmp";

#[derive(Debug)]
pub struct DiskEntryStore {
    root: PathBuf,
    dimension: usize,
    // Also serves as the write lock for entry files.
    ids: RwLock<BTreeSet<EntryId>>,
}

impl DiskEntryStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, dimension: usize) -> StoreResult<Self> {
        let root = root.into();
        let entries_dir = root.join(ENTRIES_DIR);
        fs::create_dir_all(&entries_dir)?;

        let mut ids = BTreeSet::new();
        let mut stale = 0usize;

        for dir_entry in fs::read_dir(&entries_dir)? {
            let path = dir_entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if name.ends_with(TEMP_EXTENSION) {
                fs::remove_file(&path)?;
                stale += 1;
                continue;
            }

            if let Some(ext) = path.extension()
                && ext == RKYV_EXTENSION
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && let Ok(id) = u64::from_str_radix(stem, 16)
            {
                ids.insert(EntryId::new(id));
            }
        }

        if stale > 0 {
            warn!(count = stale, path = %entries_dir.display(), "Removed interrupted writes");
        }
        info!(
            path = %root.display(),
            entries = ids.len(),
            dimension,
            "Opened disk entry store"
        );

        Ok(Self {
            root,
            dimension,
            ids: RwLock::new(ids),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entries_dir(&self) -> PathBuf {
        self.root.join(ENTRIES_DIR)
    }

    fn entry_path(&self, id: EntryId) -> PathBuf {
        self.entries_dir()
            .join(format!("{}.{}", id, RKYV_EXTENSION))
    }

    fn temp_entry_path(&self, id: EntryId) -> PathBuf {
        self.entries_dir()
            .join(format!("{}.{}", id, TEMP_EXTENSION))
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    fn read_entry(&self, id: EntryId) -> StoreResult<Option<Entry>> {
        let path = self.entry_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut aligned = AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(&bytes);

        let entry = rkyv::from_bytes::<Entry, RkyvError>(&aligned).map_err(|e| {
            StoreError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;

        if entry.id != id {
            return Err(StoreError::Corrupt {
                path,
                reason: format!("file holds entry {}", entry.id),
            });
        }
        Ok(Some(entry))
    }

    fn write_atomic(path: &Path, temp_path: &Path, bytes: &[u8]) -> StoreResult<()> {
        {
            let mut file = File::create(temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

impl EntryStore for DiskEntryStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn upsert(&self, entry: Entry) -> StoreResult<()> {
        let mut ids = self.ids.write();

        let existing = if ids.contains(&entry.id) {
            self.read_entry(entry.id)?.map(|e| e.reference)
        } else {
            None
        };
        check_upsert(&entry, existing.as_deref(), self.dimension)?;

        let bytes = to_bytes::<RkyvError>(&entry)
            .map_err(|e| StoreError::Serialization(format!("{:?}", e)))?;
        Self::write_atomic(
            &self.entry_path(entry.id),
            &self.temp_entry_path(entry.id),
            &bytes,
        )?;

        ids.insert(entry.id);
        debug!(id = %entry.id, reference = %entry.reference, "Stored entry");
        Ok(())
    }

    fn get(&self, id: EntryId) -> StoreResult<Option<Entry>> {
        if !self.ids.read().contains(&id) {
            return Ok(None);
        }
        self.read_entry(id)
    }

    fn scan(&self, after: Option<EntryId>, limit: usize) -> StoreResult<Vec<Entry>> {
        let lower = match after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        let page: Vec<EntryId> = self
            .ids
            .read()
            .range((lower, Bound::Unbounded))
            .take(limit)
            .copied()
            .collect();

        let mut entries = Vec::with_capacity(page.len());
        for id in page {
            // Deleted between the id snapshot and the read.
            if let Some(entry) = self.read_entry(id)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.ids.read().len())
    }

    fn delete(&self, id: EntryId) -> StoreResult<bool> {
        let mut ids = self.ids.write();
        if !ids.remove(&id) {
            return Ok(false);
        }
        match fs::remove_file(self.entry_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => {
                ids.insert(id);
                Err(e.into())
            }
        }
    }

    fn clear(&self) -> StoreResult<()> {
        let mut ids = self.ids.write();
        let entries_dir = self.entries_dir();
        if entries_dir.exists() {
            fs::remove_dir_all(&entries_dir)?;
        }
        fs::create_dir_all(&entries_dir)?;
        ids.clear();
        info!(path = %self.root.display(), "Cleared disk entry store");
        Ok(())
    }

    fn manifest(&self) -> StoreResult<Option<StoreManifest>> {
        let path = self.manifest_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path,
                reason: e.to_string(),
            })
    }

    fn set_manifest(&self, manifest: StoreManifest) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let path = self.manifest_path();
        let temp_path = path.with_extension("json.tmp");
        Self::write_atomic(&path, &temp_path, &bytes)
    }
}
