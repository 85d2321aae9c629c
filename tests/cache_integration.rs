//! Integration tests for the content cache through the public surface.

use bidscope::cache::{CacheCategory, ContentCache};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_entries_survive_cache_restart() {
    let dir = TempDir::new().unwrap();
    let payload = json!({"combined_text": "tender body", "files": ["a.txt"]});

    {
        let cache = ContentCache::new(dir.path().to_path_buf());
        assert!(cache.set(CacheCategory::Documents, "fp-restart", payload.clone()));
    }

    let reopened = ContentCache::new(dir.path().to_path_buf());
    assert_eq!(
        reopened.get(CacheCategory::Documents, "fp-restart"),
        Some(payload)
    );
}

#[test]
fn test_categories_do_not_share_keys() {
    let dir = TempDir::new().unwrap();
    let cache = ContentCache::new(dir.path().to_path_buf());

    cache.set(CacheCategory::Documents, "shared-key", json!("docs"));
    cache.set(CacheCategory::Search, "shared-key", json!("search"));

    assert_eq!(
        cache.get(CacheCategory::Documents, "shared-key"),
        Some(json!("docs"))
    );
    assert_eq!(
        cache.get(CacheCategory::Search, "shared-key"),
        Some(json!("search"))
    );
    assert_eq!(cache.get(CacheCategory::Analysis, "shared-key"), None);
}

#[test]
fn test_clear_one_category_leaves_others() {
    let dir = TempDir::new().unwrap();
    let cache = ContentCache::new(dir.path().to_path_buf());

    cache.set(CacheCategory::Documents, "fp-docs", json!(1));
    cache.set(CacheCategory::Search, "fp-search", json!(2));
    cache.set(CacheCategory::Analysis, "opp-1", json!(3));

    cache.clear(Some(CacheCategory::Search));

    assert_eq!(cache.get(CacheCategory::Search, "fp-search"), None);
    assert!(cache.get(CacheCategory::Documents, "fp-docs").is_some());
    assert!(cache.get(CacheCategory::Analysis, "opp-1").is_some());

    cache.clear(None);
    assert_eq!(cache.get(CacheCategory::Documents, "fp-docs"), None);
    assert_eq!(cache.get(CacheCategory::Analysis, "opp-1"), None);
}

#[test]
fn test_stats_count_entries_per_category() {
    let dir = TempDir::new().unwrap();
    let cache = ContentCache::new(dir.path().to_path_buf());

    cache.set(CacheCategory::Documents, "fp-1", json!("a"));
    cache.set(CacheCategory::Documents, "fp-2", json!("b"));
    cache.set(CacheCategory::Analysis, "opp-1", json!("c"));

    let stats = cache.stats();
    assert_eq!(stats.documents, 2);
    assert_eq!(stats.search, 0);
    assert_eq!(stats.analysis, 1);
    assert!(stats.total_bytes > 0);
}

#[test]
fn test_overwrite_replaces_payload() {
    let dir = TempDir::new().unwrap();
    let cache = ContentCache::new(dir.path().to_path_buf());

    cache.set(CacheCategory::Search, "fp", json!({"results": []}));
    cache.set(CacheCategory::Search, "fp", json!({"results": ["updated"]}));

    assert_eq!(
        cache.get(CacheCategory::Search, "fp"),
        Some(json!({"results": ["updated"]}))
    );

    let stats = cache.stats();
    assert_eq!(stats.search, 1);
}

#[test]
fn test_corrupt_entry_reads_as_miss() {
    let dir = TempDir::new().unwrap();
    let cache = ContentCache::new(dir.path().to_path_buf());

    cache.set(CacheCategory::Documents, "fp-corrupt", json!("ok"));
    std::fs::write(
        dir.path().join("documents/fp-corrupt.json"),
        b"not valid json",
    )
    .unwrap();

    // A fresh cache has no memory copy, so the damaged file is the only
    // source and the lookup degrades to a miss.
    let reopened = ContentCache::new(dir.path().to_path_buf());
    assert_eq!(reopened.get(CacheCategory::Documents, "fp-corrupt"), None);
}
