//! Page-size persistence across store lifetimes

use appconfig_store::{
    AppConfig, BusyCounter, ConfigStore, FileKeyValueStore, FindManyParams,
    InMemoryAppConfigService, KeyValueStore, ServiceError,
};
use std::path::Path;
use std::sync::Arc;

fn store_with_file(service: &InMemoryAppConfigService, path: &Path) -> ConfigStore {
    ConfigStore::new(
        Arc::new(service.clone()),
        Arc::new(FileKeyValueStore::new(path)),
        BusyCounter::new(),
    )
}

fn seeded(count: usize) -> InMemoryAppConfigService {
    InMemoryAppConfigService::with_records(
        (0..count)
            .map(|i| AppConfig::new(format!("id-{}", i), format!("k{}", i), "v"))
            .collect(),
    )
}

#[tokio::test]
async fn test_default_take_without_stored_value() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with_file(&seeded(0), &dir.path().join("storage.json"));

    assert_eq!(store.pagination().take, 5);
    assert_eq!(store.pagination().skip, 0);
    assert_eq!(store.pagination().total, 0);
}

#[tokio::test]
async fn test_take_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let service = seeded(30);

    let store = store_with_file(&service, &path);
    store
        .list(FindManyParams {
            skip: Some(0),
            take: Some(20),
        })
        .await
        .unwrap();
    drop(store);

    assert_eq!(FileKeyValueStore::new(&path).get("take").as_deref(), Some("20"));

    let restarted = store_with_file(&service, &path);
    assert_eq!(restarted.pagination().take, 20);
}

#[tokio::test]
async fn test_list_without_take_persists_total() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let store = store_with_file(&seeded(12), &path);
    store.list(FindManyParams::default()).await.unwrap();

    assert_eq!(store.pagination().take, 12);
    assert_eq!(FileKeyValueStore::new(&path).get("take").as_deref(), Some("12"));
}

#[tokio::test]
async fn test_failed_list_does_not_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let service = seeded(3);
    service.fail_next(ServiceError::new("down"));

    let store = store_with_file(&service, &path);
    let _ = store
        .list(FindManyParams {
            skip: None,
            take: Some(50),
        })
        .await;

    assert_eq!(FileKeyValueStore::new(&path).get("take"), None);
    assert_eq!(store.pagination().take, 5);
}

#[tokio::test]
async fn test_non_numeric_stored_take_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    FileKeyValueStore::new(&path).set("take", "lots").unwrap();

    let store = store_with_file(&seeded(0), &path);
    assert_eq!(store.pagination().take, 5);
}

#[tokio::test]
async fn test_unwritable_storage_does_not_fail_list() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes every write fail
    let path = dir.path().join("storage.json");
    std::fs::create_dir(&path).unwrap();

    let store = store_with_file(&seeded(2), &path);
    store
        .list(FindManyParams {
            skip: Some(0),
            take: Some(2),
        })
        .await
        .unwrap();

    assert_eq!(store.records().len(), 2);
    assert!(store.error().is_none());
}
