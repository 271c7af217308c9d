//! Unit tests for the in-memory cache engine

use std::time::Duration;
use tokio::time::sleep;

use crate::errors::CacheError;
use crate::repositories::cache::{CacheEngine, MemoryCacheEngine};

const PAST_ONE_SECOND: Duration = Duration::from_millis(1100);

#[tokio::test]
async fn test_set_get_delete() {
    let cache = MemoryCacheEngine::new();

    cache.set("a", "123", None).await.unwrap();
    assert_eq!(cache.get("a").await.unwrap(), Some("123".to_string()));

    assert!(cache.delete("a").await.unwrap());
    assert!(!cache.delete("a").await.unwrap());
    assert_eq!(cache.get("a").await.unwrap(), None);
}

#[tokio::test]
async fn test_ttl_expiry() {
    let cache = MemoryCacheEngine::new();

    cache.set("a", "123", Some(1)).await.unwrap();
    assert_eq!(cache.get("a").await.unwrap(), Some("123".to_string()));

    sleep(PAST_ONE_SECOND).await;
    assert_eq!(cache.get("a").await.unwrap(), None);
    assert!(!cache.delete("a").await.unwrap());
}

#[tokio::test]
async fn test_zero_ttl_expires_immediately() {
    let cache = MemoryCacheEngine::new();

    cache.set("a", "old", None).await.unwrap();
    cache.set("a", "new", Some(0)).await.unwrap();

    assert_eq!(cache.get("a").await.unwrap(), None);
    assert!(!cache.keys().await.unwrap().contains(&"a".to_string()));
}

#[tokio::test]
async fn test_default_ttl_applies_to_untimed_writes() {
    let cache = MemoryCacheEngine::with_default_ttl(1);

    cache.set("a", "1", None).await.unwrap();
    cache.set("b", "2", Some(60)).await.unwrap();
    sleep(PAST_ONE_SECOND).await;

    assert_eq!(cache.get("a").await.unwrap(), None);
    assert_eq!(cache.get("b").await.unwrap(), Some("2".to_string()));
}

#[tokio::test]
async fn test_update_ttl() {
    let cache = MemoryCacheEngine::new();

    cache.set("foo", "bar", None).await.unwrap();
    assert!(cache.update_ttl("foo", 1).await.unwrap());
    assert!(!cache.update_ttl("nope", 1).await.unwrap());

    sleep(PAST_ONE_SECOND).await;
    assert_eq!(cache.get("foo").await.unwrap(), None);
}

#[tokio::test]
async fn test_keys_purges_expired() {
    let cache = MemoryCacheEngine::new();

    cache.set("a", "1", Some(1)).await.unwrap();
    cache.set("b", "2", None).await.unwrap();
    assert_eq!(cache.len().await, 2);

    sleep(PAST_ONE_SECOND).await;
    let keys = cache.keys().await.unwrap();
    assert!(keys.contains(&"b".to_string()));
    assert!(!keys.contains(&"a".to_string()));
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_reset_all() {
    let cache = MemoryCacheEngine::new();

    cache.set("a", "1", None).await.unwrap();
    cache.list_push_front("l", "x").await.unwrap();
    cache.reset_all().await.unwrap();

    assert!(cache.keys().await.unwrap().is_empty());
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_list_push_front() {
    let cache = MemoryCacheEngine::new();

    assert_eq!(cache.list_push_front("list", "1").await.unwrap(), 1);
    assert_eq!(cache.list_push_front("list", "2").await.unwrap(), 2);
    assert_eq!(cache.list_push_front("list", "3").await.unwrap(), 3);
    assert_eq!(cache.list_all("list").await.unwrap(), vec!["3", "2", "1"]);
}

#[tokio::test]
async fn test_list_find_and_range() {
    let cache = MemoryCacheEngine::new();
    for value in ["4", "3", "2", "1"] {
        cache.list_push_front("nums", value).await.unwrap();
    }

    assert_eq!(cache.list_find("nums", "2").await.unwrap(), Some(1));
    assert_eq!(cache.list_find("nums", "99").await.unwrap(), None);
    assert_eq!(cache.list_find("missing", "1").await.unwrap(), None);

    assert_eq!(cache.list_range("nums", 1, 3).await.unwrap(), vec!["2", "3"]);
    assert_eq!(cache.list_range("nums", 0, -1).await.unwrap(), vec!["1", "2", "3", "4"]);
    assert!(cache.list_range("missing", 0, -1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_remove() {
    let cache = MemoryCacheEngine::new();
    for value in ["a", "b", "a", "c", "a"] {
        cache.list_push_front("l", value).await.unwrap();
    }

    assert_eq!(cache.list_remove("l", "a", 1).await.unwrap(), 1);
    assert_eq!(cache.list_all("l").await.unwrap(), vec!["c", "a", "b", "a"]);

    assert_eq!(cache.list_remove("l", "a", -1).await.unwrap(), 1);
    assert_eq!(cache.list_all("l").await.unwrap(), vec!["c", "a", "b"]);

    assert_eq!(cache.list_remove("missing", "x", 0).await.unwrap(), 0);
}

#[tokio::test]
async fn test_emptied_list_disappears() {
    let cache = MemoryCacheEngine::new();
    cache.list_push_front("l", "only").await.unwrap();

    assert_eq!(cache.list_remove("l", "only", 0).await.unwrap(), 1);
    assert!(cache.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_ops_on_text_key_fail() {
    let cache = MemoryCacheEngine::new();
    cache.set("notlist", "123", None).await.unwrap();

    let mismatch = CacheError::TypeMismatch {
        key: "notlist".to_string(),
    };
    assert_eq!(cache.list_push_front("notlist", "1").await.unwrap_err(), mismatch);
    assert_eq!(cache.list_find("notlist", "1").await.unwrap_err(), mismatch);
    assert_eq!(cache.list_range("notlist", 0, -1).await.unwrap_err(), mismatch);
    assert_eq!(cache.list_remove("notlist", "1", 0).await.unwrap_err(), mismatch);
}

#[tokio::test]
async fn test_get_on_list_key_fails() {
    let cache = MemoryCacheEngine::new();
    cache.list_push_front("l", "x").await.unwrap();

    assert!(matches!(
        cache.get("l").await,
        Err(CacheError::TypeMismatch { .. })
    ));
    assert!(cache.delete("l").await.unwrap());
}

#[tokio::test]
async fn test_expired_list_is_recreated() {
    let cache = MemoryCacheEngine::new();
    cache.list_push_front("l", "old").await.unwrap();
    assert!(cache.update_ttl("l", 1).await.unwrap());

    sleep(PAST_ONE_SECOND).await;
    assert_eq!(cache.list_push_front("l", "new").await.unwrap(), 1);
    assert_eq!(cache.list_all("l").await.unwrap(), vec!["new"]);
}

#[tokio::test]
async fn test_clones_share_storage() {
    let cache = MemoryCacheEngine::new();
    let other = cache.clone();

    cache.set("shared", "yes", None).await.unwrap();
    assert_eq!(other.get("shared").await.unwrap(), Some("yes".to_string()));
}
