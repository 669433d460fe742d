//! Result cache collaborator.
//!
//! Solutions are memoized under a content-addressed key: a prefix naming the
//! problem followed by the canonical JSON of the request body. Canonical here
//! means object keys are sorted, so two bodies that differ only in key order
//! map to the same entry.

use crate::error::CacheError;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default entry lifetime, one hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Build the cache key for `instance` under `prefix`.
pub fn cache_key<T: Serialize + ?Sized>(prefix: &str, instance: &T) -> Result<String, CacheError> {
    // serde_json's `Value` map keeps keys sorted, which gives the canonical form.
    let canonical = serde_json::to_value(instance)?;
    Ok(format!("{}:{}", prefix, serde_json::to_string(&canonical)?))
}

/// A key-value store with per-entry expiry.
///
/// Stale reads within the expiry window are acceptable; two concurrent solves
/// of the same key may both write, and the last write wins.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

struct Entry {
    value: String,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |t| t > now)
    }
}

/// In-process cache backed by a mutex-guarded map.
///
/// Expired entries are dropped when read and swept on every `put`;
/// [`MemoryCache::purge_expired`] runs the same sweep on demand.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Unavailable("cache lock poisoned".to_string()))
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let mut entries = self.lock()?;
        Ok(sweep(&mut entries, Instant::now()))
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let entry = Entry {
            value,
            expires_at: now.checked_add(ttl),
        };
        let mut entries = self.lock()?;
        sweep(&mut entries, now);
        entries.insert(key.to_string(), entry);
        Ok(())
    }
}

/// Drop expired entries, returning how many went.
fn sweep(entries: &mut HashMap<String, Entry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, e| e.is_live(now));
    before - entries.len()
}

/// A cache that stores nothing; every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl ResultCache for NoCache {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    fn put(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}
