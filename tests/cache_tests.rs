use featureflags::{build_cache_key, LocalCache};
use std::time::Duration;

async fn settle() {
    // Let the sweep task observe a timer that fired during the last sleep
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_entry_valid_at_exactly_ttl() {
    let cache: LocalCache<String> = LocalCache::new(Duration::from_millis(1000));
    cache.set("key", "value".to_string());

    tokio::time::advance(Duration::from_millis(1000)).await;

    assert_eq!(cache.get("key"), Some("value".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_strictly_after_ttl() {
    let cache: LocalCache<String> = LocalCache::new(Duration::from_millis(1000));
    cache.set("key", "value".to_string());

    tokio::time::advance(Duration::from_millis(1001)).await;

    assert_eq!(cache.len(), 1);
    assert!(cache.get("key").is_none());
    // Lazy eviction removed it
    assert_eq!(cache.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_overwrite_resets_age() {
    let cache: LocalCache<&'static str> = LocalCache::new(Duration::from_millis(1000));
    cache.set("key", "v1");

    tokio::time::advance(Duration::from_millis(800)).await;
    cache.set("key", "v2");
    tokio::time::advance(Duration::from_millis(800)).await;

    assert_eq!(cache.get("key"), Some("v2"));
}

#[tokio::test(start_paused = true)]
async fn test_sweep_removes_only_expired_entries() {
    let cache: LocalCache<i32> =
        LocalCache::with_cleanup_interval(Duration::from_millis(1000), Duration::from_millis(30_000));

    cache.set("key1", 1);
    cache.set("key2", 2);

    tokio::time::sleep(Duration::from_millis(29_000)).await;
    cache.set("key3", 3);

    // Reaches the 30s sweep boundary
    tokio::time::sleep(Duration::from_millis(1000)).await;
    settle().await;

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("key3"), Some(3));
    assert!(cache.get("key1").is_none());
    assert!(cache.get("key2").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_unread_entries_do_not_accumulate() {
    let cache: LocalCache<i32> =
        LocalCache::with_cleanup_interval(Duration::from_millis(100), Duration::from_millis(1000));

    for i in 0..50 {
        cache.set(format!("key{}", i), i);
    }
    assert_eq!(cache.len(), 50);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    settle().await;

    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_sweep_and_clears() {
    let cache: LocalCache<i32> =
        LocalCache::with_cleanup_interval(Duration::from_millis(100), Duration::from_millis(1000));
    cache.set("key", 1);

    cache.shutdown();
    assert!(cache.is_empty());

    // Entries written after shutdown are no longer swept
    cache.set("late", 2);
    tokio::time::sleep(Duration::from_millis(5000)).await;
    settle().await;

    assert_eq!(cache.len(), 1);
}

#[test]
fn test_purge_without_runtime() {
    let cache: LocalCache<i32> = LocalCache::new(Duration::from_millis(1));
    cache.set("key", 1);

    std::thread::sleep(Duration::from_millis(5));

    assert_eq!(cache.purge_expired(), 1);
    assert!(cache.is_empty());
}

#[test]
fn test_cache_key_construction() {
    assert_eq!(build_cache_key("my-flag", None), build_cache_key("my-flag", None));
    assert_ne!(
        build_cache_key("my-flag", None),
        build_cache_key("my-flag", Some("user-42"))
    );
    assert_ne!(
        build_cache_key("my-flag", Some("user-1")),
        build_cache_key("my-flag", Some("user-2"))
    );
}
