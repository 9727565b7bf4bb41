//! Snapshot persistence tests for the path cache.

use drivepath_cache::PathCache;
use drivepath_core::config::PathCacheConfig;

#[tokio::test]
async fn test_store_then_load_restores_both_directions() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nested").join("PathStorage.json");

    let cache = PathCache::load(&file).await;
    assert!(cache.is_empty().await);
    cache.add("f1", "Docs/").await;
    cache.add("f2", "Docs/Reports").await;
    cache.store().await.unwrap();

    let restored = PathCache::load(&file).await;
    assert_eq!(restored.get_id("Docs/Reports").await.as_deref(), Some("f2"));
    assert_eq!(restored.get_path("f1").await.as_deref(), Some("Docs/"));
    assert_eq!(restored.len().await, 2);
}

#[tokio::test]
async fn test_snapshot_is_array_of_two_maps() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("cache.json");

    let cache = PathCache::load(&file).await;
    cache.add("f1", "A").await;
    cache.store().await.unwrap();

    let raw = std::fs::read_to_string(&file).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["f1"], "A/");
    assert_eq!(value[1]["A/"], "f1");
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("cache.json");
    std::fs::write(&file, b"{ not json").unwrap();

    let cache = PathCache::load(&file).await;
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_inconsistent_snapshot_is_rebuilt_from_id_map() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("cache.json");
    std::fs::write(&file, br#"[{"f1":"A/"},{"A/":"stale","B/":"f9"}]"#).unwrap();

    let cache = PathCache::load(&file).await;
    assert_eq!(cache.get_id("A").await.as_deref(), Some("f1"));
    assert_eq!(cache.get_id("B").await, None);
    assert_eq!(cache.get_path("stale").await, None);
}

#[tokio::test]
async fn test_from_config_without_persistence_has_no_location() {
    let cache = PathCache::from_config(&PathCacheConfig::default()).await;
    assert!(cache.snapshot_path().is_none());
}
