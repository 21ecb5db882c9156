use super::*;

use std::sync::Arc;

use crate::entry::{Entry, EntryId, ValidationError};
use crate::index::{MemoryIndex, MockIndex, SimilarityIndex};

fn entry(reference: &str, embedding: Vec<f32>) -> Entry {
    Entry::new(reference, format!("text of {}", reference), embedding)
}

#[test]
fn test_memory_store_basic_operations() {
    let store = MemoryEntryStore::new(2);
    let e = entry("a", vec![1.0, 0.0]);

    store.upsert(e.clone()).unwrap();
    assert_eq!(store.get(e.id).unwrap(), Some(e.clone()));
    assert_eq!(store.count().unwrap(), 1);

    assert!(store.delete(e.id).unwrap());
    assert!(!store.delete(e.id).unwrap());
    assert_eq!(store.get(e.id).unwrap(), None);
}

#[test]
fn test_memory_store_validation() {
    let store = MemoryEntryStore::new(2);

    let err = store.upsert(entry("a", vec![1.0])).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::DimensionMismatch {
            expected: 2,
            actual: 1,
            ..
        })
    ));

    let err = store.upsert(entry("  ", vec![1.0, 0.0])).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::EmptyReference)
    ));

    let err = store.upsert(entry("b", vec![f32::INFINITY, 0.0])).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::NonFiniteEmbedding { position: 0, .. })
    ));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_cursor_is_restartable() {
    let store = MemoryEntryStore::new(2);
    for i in 0..10 {
        store.upsert(entry(&format!("r{}", i), vec![1.0, i as f32])).unwrap();
    }

    let first: Vec<EntryId> = store.all(4).map(|e| e.unwrap().id).collect();
    let second: Vec<EntryId> = store.all(3).map(|e| e.unwrap().id).collect();
    assert_eq!(first.len(), 10);
    assert_eq!(first, second);

    let mut cursor = store.all(4);
    let sizes: Vec<usize> = std::iter::from_fn(|| cursor.next_page())
        .map(|p| p.unwrap().len())
        .collect();
    assert_eq!(sizes, vec![4, 4, 2]);
}

#[test]
fn test_manifest_round_trip() {
    let store = MemoryEntryStore::new(2);
    assert_eq!(store.manifest().unwrap(), None);
    store.set_manifest(StoreManifest::new("m", 2)).unwrap();
    assert_eq!(store.manifest().unwrap(), Some(StoreManifest::new("m", 2)));
}

fn catalog(dim: usize) -> Catalog<MemoryEntryStore, MemoryIndex> {
    Catalog::new(
        Arc::new(MemoryEntryStore::new(dim)),
        Arc::new(MemoryIndex::new(dim)),
    )
}

#[tokio::test]
async fn test_catalog_upsert_writes_both() {
    let catalog = catalog(2);
    let e = entry("a", vec![1.0, 0.0]);
    catalog.upsert(e.clone()).await.unwrap();

    assert_eq!(catalog.get(e.id).unwrap(), Some(e.clone()));
    let hits = catalog.index().query(&[1.0, 0.0], 1).await.unwrap();
    assert_eq!(hits[0].id, e.id);
    assert_eq!(hits[0].payload.reference, "a");
}

#[tokio::test]
async fn test_catalog_batch_rejected_atomically() {
    let catalog = catalog(2);
    let good = entry("a", vec![1.0, 0.0]);
    let bad = entry("b", vec![0.0, 0.0]);

    let err = catalog.upsert_batch(vec![good.clone(), bad]).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Store(StoreError::Validation(ValidationError::ZeroEmbedding { .. }))
    ));
    assert_eq!(catalog.count().unwrap(), 0);
    assert_eq!(catalog.index().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_catalog_batch_rejects_id_shared_within_batch() {
    let catalog = catalog(2);
    let id = EntryId::new(7);
    let first = Entry::with_id(id, "A", "alpha", vec![1.0, 0.0]);
    let second = Entry::with_id(id, "B", "beta", vec![0.0, 1.0]);

    let err = catalog.upsert_batch(vec![first, second]).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Store(StoreError::Validation(ValidationError::IdCollision { .. }))
    ));
    assert_eq!(catalog.get(id).unwrap(), None);
    assert!(!catalog.index().contains(id));
}

#[tokio::test]
async fn test_catalog_batch_repeated_entry_keeps_last() {
    let catalog = catalog(2);
    let id = EntryId::new(9);
    let older = Entry::with_id(id, "A", "alpha", vec![1.0, 0.0]);
    let newer = Entry::with_id(id, "A", "alpha revised", vec![0.0, 1.0]);

    catalog.upsert_batch(vec![older, newer.clone()]).await.unwrap();
    assert_eq!(catalog.get(id).unwrap(), Some(newer));
    let hits = catalog.index().query(&[0.0, 1.0], 1).await.unwrap();
    assert_eq!(hits[0].payload.text, "alpha revised");
}

#[tokio::test]
async fn test_catalog_index_failure_leaves_store_untouched() {
    let catalog = Catalog::new(
        Arc::new(MemoryEntryStore::new(2)),
        Arc::new(MockIndex::new(2)),
    );
    catalog.index().set_fail_upserts(true);

    let e = entry("a", vec![1.0, 0.0]);
    let err = catalog.upsert(e.clone()).await.unwrap_err();
    assert!(matches!(err, CatalogError::Index(_)));
    assert_eq!(catalog.get(e.id).unwrap(), None);
}

#[tokio::test]
async fn test_catalog_delete_removes_both() {
    let catalog = catalog(2);
    let e = entry("a", vec![1.0, 0.0]);
    catalog.upsert(e.clone()).await.unwrap();

    assert!(catalog.delete(e.id).await.unwrap());
    assert!(!catalog.delete(e.id).await.unwrap());
    assert_eq!(catalog.get(e.id).unwrap(), None);
    assert!(catalog.index().query(&[1.0, 0.0], 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_catalog_rebuild_index_from_store() {
    let store = Arc::new(MemoryEntryStore::new(2));
    for i in 0..5 {
        store.upsert(entry(&format!("r{}", i), vec![1.0, i as f32])).unwrap();
    }
    let index = Arc::new(MemoryIndex::new(2));
    index
        .upsert(EntryId::new(1), vec![0.0, 1.0], crate::entry::Payload::new("stale", "x"))
        .await
        .unwrap();

    let catalog = Catalog::new(store, Arc::clone(&index));
    assert_eq!(catalog.rebuild_index(2).await.unwrap(), 5);
    assert_eq!(index.count().await.unwrap(), 5);
    assert!(!index.contains(EntryId::new(1)));
}

#[tokio::test]
async fn test_catalog_reset_replaces_manifest() {
    let catalog = catalog(2);
    catalog.upsert(entry("a", vec![1.0, 0.0])).await.unwrap();
    catalog.set_manifest(StoreManifest::new("old", 2)).await.unwrap();

    catalog.reset(StoreManifest::new("new", 2)).await.unwrap();
    assert_eq!(catalog.count().unwrap(), 0);
    assert_eq!(catalog.index().count().await.unwrap(), 0);
    assert_eq!(
        catalog.manifest().unwrap(),
        Some(StoreManifest::new("new", 2))
    );
}
