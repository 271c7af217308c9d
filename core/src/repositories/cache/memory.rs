//! In-process cache engine with lazy TTL expiry.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::CacheError;

use super::r#trait::{remove_matching, slice_bounds, CacheEngine};

#[derive(Debug, Clone)]
enum CacheValue {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: CacheValue,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// Cache engine backed by a `HashMap` behind an async lock.
///
/// Expired entries are dropped lazily when touched and in bulk by `keys()`.
/// Cloning shares the underlying storage.
#[derive(Clone, Default)]
pub struct MemoryCacheEngine {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    default_ttl: Option<u64>,
}

impl MemoryCacheEngine {
    /// Create an empty engine where untimed writes never expire
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine applying `ttl` seconds to writes that carry no TTL
    pub fn with_default_ttl(ttl: u64) -> Self {
        Self {
            entries: Arc::default(),
            default_ttl: Some(ttl),
        }
    }

    /// Number of stored entries, including ones not yet purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn deadline(ttl: Option<u64>) -> Option<Instant> {
        ttl.map(|seconds| Instant::now() + Duration::from_secs(seconds))
    }
}

/// Live entry for `key`, dropping it first if it has lapsed
fn live_entry<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
    if entries.get(key).is_some_and(|entry| entry.is_expired(Instant::now())) {
        debug!("Dropping expired key '{}'", key);
        entries.remove(key);
        return None;
    }
    entries.get_mut(key)
}

fn type_mismatch(key: &str) -> CacheError {
    CacheError::TypeMismatch {
        key: key.to_string(),
    }
}

#[async_trait]
impl CacheEngine for MemoryCacheEngine {
    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), CacheError> {
        let expires_at = Self::deadline(ttl.or(self.default_ttl));
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: CacheValue::Text(value.to_string()),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.write().await;
        match live_entry(&mut entries, key) {
            None => Ok(None),
            Some(Entry { value: CacheValue::Text(text), .. }) => Ok(Some(text.clone())),
            Some(_) => Err(type_mismatch(key)),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut entries = self.entries.write().await;
        let existed = live_entry(&mut entries, key).is_some();
        entries.remove(key);
        Ok(existed)
    }

    async fn update_ttl(&self, key: &str, ttl: u64) -> Result<bool, CacheError> {
        let mut entries = self.entries.write().await;
        match live_entry(&mut entries, key) {
            Some(entry) => {
                entry.expires_at = Self::deadline(Some(ttl));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(entries.keys().cloned().collect())
    }

    async fn list_push_front(&self, key: &str, value: &str) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().await;
        match live_entry(&mut entries, key) {
            Some(Entry { value: CacheValue::List(list), .. }) => {
                list.insert(0, value.to_string());
                Ok(list.len())
            }
            Some(_) => Err(type_mismatch(key)),
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: CacheValue::List(vec![value.to_string()]),
                        expires_at: None,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn list_find(&self, key: &str, value: &str) -> Result<Option<usize>, CacheError> {
        let mut entries = self.entries.write().await;
        match live_entry(&mut entries, key) {
            Some(Entry { value: CacheValue::List(list), .. }) => {
                Ok(list.iter().position(|item| item == value))
            }
            Some(_) => Err(type_mismatch(key)),
            None => Ok(None),
        }
    }

    async fn list_range(
        &self,
        key: &str,
        start: isize,
        end: isize,
    ) -> Result<Vec<String>, CacheError> {
        let mut entries = self.entries.write().await;
        match live_entry(&mut entries, key) {
            Some(Entry { value: CacheValue::List(list), .. }) => {
                let bounds = slice_bounds(list.len(), start, end);
                Ok(list[bounds].to_vec())
            }
            Some(_) => Err(type_mismatch(key)),
            None => Ok(Vec::new()),
        }
    }

    async fn list_remove(&self, key: &str, value: &str, count: isize) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().await;
        let (removed, now_empty) = match live_entry(&mut entries, key) {
            Some(Entry { value: CacheValue::List(list), .. }) => {
                let removed = remove_matching(list, value, count);
                (removed, list.is_empty())
            }
            Some(_) => return Err(type_mismatch(key)),
            None => return Ok(0),
        };
        if now_empty {
            entries.remove(key);
        }
        Ok(removed)
    }

    async fn reset_all(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        debug!("Clearing {} cache entries", entries.len());
        entries.clear();
        Ok(())
    }
}
