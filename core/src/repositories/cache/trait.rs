//! Cache engine contract consumed by the session coordinator.

use async_trait::async_trait;
use std::ops::Range;

use crate::errors::CacheError;

/// Key/value storage with per-key TTL plus ordered-list primitives.
///
/// The engine is a dumb store: it knows nothing about sessions. Values are
/// either strings or lists of strings, the way a remote data-structure store
/// holds them. Any backend honouring this contract can be injected into the
/// coordinator.
///
/// # Type rules
/// - List primitives on a key holding a string fail with
///   [`CacheError::TypeMismatch`]; `get` on a list fails the same way.
/// - List primitives on a missing key return their empty/zero result.
/// - A list whose last element is removed disappears.
///
/// # TTL
/// TTLs are whole seconds. A key whose TTL has lapsed behaves exactly like a
/// missing key, and a TTL of 0 lapses at once. Timeouts for a single call are the backend's business.
#[async_trait]
pub trait CacheEngine: Send + Sync {
    /// Store a string value, replacing whatever the key held.
    ///
    /// `ttl` overrides the engine default; `None` with no default means the
    /// key never expires.
    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), CacheError>;

    /// Read a string value
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Remove a key of any type, reporting whether it existed
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Reset the TTL of an existing key; `false` when the key is absent
    async fn update_ttl(&self, key: &str, ttl: u64) -> Result<bool, CacheError>;

    /// All live keys; lapsed entries are purged before listing
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Insert at the head of the list, creating it if needed; returns the new length
    async fn list_push_front(&self, key: &str, value: &str) -> Result<usize, CacheError>;

    /// Position of the first occurrence of `value`
    async fn list_find(&self, key: &str, value: &str) -> Result<Option<usize>, CacheError>;

    /// Elements in `[start, end)`; `end == -1` reads to the end of the list.
    ///
    /// See [`slice_bounds`] for the index rules.
    async fn list_range(
        &self,
        key: &str,
        start: isize,
        end: isize,
    ) -> Result<Vec<String>, CacheError>;

    /// Remove occurrences of `value`: all of them when `count == 0`, at most
    /// `count` from the head when positive, at most `|count|` from the tail
    /// when negative. Returns the number removed.
    async fn list_remove(&self, key: &str, value: &str, count: isize) -> Result<usize, CacheError>;

    /// Drop every key managed by this engine instance
    async fn reset_all(&self) -> Result<(), CacheError>;

    /// Whole list stored at `key`
    async fn list_all(&self, key: &str) -> Result<Vec<String>, CacheError> {
        self.list_range(key, 0, -1).await
    }
}

/// Resolve `[start, end)` list bounds against a list of `len` elements.
///
/// Negative indices count from the end and clamp at the head; `end == -1`
/// is the end of the list. Out-of-range bounds clamp, and an inverted range
/// is empty.
pub fn slice_bounds(len: usize, start: isize, end: isize) -> Range<usize> {
    let resolve = |index: isize| -> usize {
        if index < 0 {
            len.saturating_sub(index.unsigned_abs())
        } else {
            index.unsigned_abs().min(len)
        }
    };

    let from = resolve(start);
    let to = if end == -1 { len } else { resolve(end) };

    if from >= to {
        0..0
    } else {
        from..to
    }
}

/// Apply `list_remove` semantics to an in-process list, returning the count removed
pub fn remove_matching(list: &mut Vec<String>, value: &str, count: isize) -> usize {
    let before = list.len();
    let limit = if count == 0 { usize::MAX } else { count.unsigned_abs() };
    let mut removed = 0;

    if count >= 0 {
        list.retain(|item| {
            if removed < limit && item == value {
                removed += 1;
                false
            } else {
                true
            }
        });
    } else {
        let mut kept: Vec<String> = Vec::with_capacity(list.len());
        for item in list.drain(..).rev() {
            if removed < limit && item == value {
                removed += 1;
            } else {
                kept.push(item);
            }
        }
        kept.reverse();
        *list = kept;
    }

    before - list.len()
}
