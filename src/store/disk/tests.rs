use super::*;

use tempfile::TempDir;

use crate::entry::ValidationError;

fn entry(reference: &str, text: &str, embedding: Vec<f32>) -> Entry {
    Entry::new(reference, text, embedding)
}

fn open(dir: &TempDir) -> DiskEntryStore {
    DiskEntryStore::open(dir.path(), 3).expect("open store")
}

#[test]
fn test_upsert_then_get() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    let e = entry("John 11:35", "Jesus wept.", vec![0.1, 0.2, 0.3]);
    store.upsert(e.clone()).unwrap();

    assert_eq!(store.get(e.id).unwrap(), Some(e));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_missing_entry_is_none() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    assert_eq!(store.get(EntryId::new(1)).unwrap(), None);
}

#[test]
fn test_reopen_restores_entries_and_manifest() {
    let dir = TempDir::new().unwrap();
    let e = entry("Genesis 1:1", "In the beginning", vec![1.0, 0.0, 0.0]);
    {
        let store = open(&dir);
        store.upsert(e.clone()).unwrap();
        store
            .set_manifest(StoreManifest::new("all-MiniLM-L6-v2", 3))
            .unwrap();
    }

    let store = open(&dir);
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.get(e.id).unwrap(), Some(e));
    assert_eq!(
        store.manifest().unwrap(),
        Some(StoreManifest::new("all-MiniLM-L6-v2", 3))
    );
}

#[test]
fn test_upsert_replaces_whole_entry() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    store
        .upsert(entry("Psalm 23:1", "old", vec![1.0, 0.0, 0.0]))
        .unwrap();
    let replaced = entry("Psalm 23:1", "new", vec![0.0, 1.0, 0.0]);
    store.upsert(replaced.clone()).unwrap();

    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.get(replaced.id).unwrap(), Some(replaced));
}

#[test]
fn test_rejects_wrong_dimension_without_writing() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    let err = store
        .upsert(entry("a", "text", vec![1.0, 0.0]))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::DimensionMismatch { .. })
    ));
    assert_eq!(store.count().unwrap(), 0);
    assert_eq!(fs::read_dir(dir.path().join(ENTRIES_DIR)).unwrap().count(), 0);
}

#[test]
fn test_rejects_id_collision() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    let id = EntryId::new(7);
    store
        .upsert(Entry::with_id(id, "first", "text", vec![1.0, 0.0, 0.0]))
        .unwrap();
    let err = store
        .upsert(Entry::with_id(id, "second", "text", vec![1.0, 0.0, 0.0]))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::IdCollision { .. })
    ));
}

#[test]
fn test_delete_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    let e = entry("a", "text", vec![1.0, 0.0, 0.0]);
    store.upsert(e.clone()).unwrap();

    assert!(store.delete(e.id).unwrap());
    assert!(!store.delete(e.id).unwrap());
    assert_eq!(store.get(e.id).unwrap(), None);
    assert!(!store.entry_path(e.id).exists());
}

#[test]
fn test_scan_pages_in_id_order() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    for i in 0..7 {
        store
            .upsert(entry(&format!("ref {}", i), "t", vec![1.0, i as f32, 0.0]))
            .unwrap();
    }

    let ids: Vec<EntryId> = store
        .all(3)
        .map(|e| e.unwrap().id)
        .collect();
    assert_eq!(ids.len(), 7);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let first = store.scan(None, 3).unwrap();
    let second = store.scan(Some(first[2].id), 3).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(second[0].id, ids[3]);
}

#[test]
fn test_clear_removes_files() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    store.upsert(entry("a", "t", vec![1.0, 0.0, 0.0])).unwrap();
    store.upsert(entry("b", "t", vec![0.0, 1.0, 0.0])).unwrap();
    store.clear().unwrap();

    assert_eq!(store.count().unwrap(), 0);
    assert_eq!(store.all(10).count(), 0);
    let reopened = open(&dir);
    assert_eq!(reopened.count().unwrap(), 0);
}

#[test]
fn test_open_removes_interrupted_writes() {
    let dir = TempDir::new().unwrap();
    let entries = dir.path().join(ENTRIES_DIR);
    fs::create_dir_all(&entries).unwrap();
    fs::write(entries.join("00000000000000aa.rkyv.tmp"), b"partial").unwrap();

    let store = open(&dir);
    assert_eq!(store.count().unwrap(), 0);
    assert_eq!(fs::read_dir(&entries).unwrap().count(), 0);
}

#[test]
fn test_corrupt_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let e = entry("a", "t", vec![1.0, 0.0, 0.0]);
    {
        let store = open(&dir);
        store.upsert(e.clone()).unwrap();
        fs::write(store.entry_path(e.id), b"garbage").unwrap();
    }

    let store = open(&dir);
    let err = store.get(e.id).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
}

#[test]
fn test_missing_manifest_is_none() {
    let dir = TempDir::new().unwrap();
    assert_eq!(open(&dir).manifest().unwrap(), None);
}
