// ABOUTME: In-memory TTL cache with LRU eviction
// ABOUTME: An expired entry is indistinguishable from an absent one
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! In-memory cache with per-entry TTL.
//!
//! Values are JSON-serialized on the way in so the cache stays type-agnostic.
//! Lookups return an explicit `Option`: expired entries are evicted and
//! reported as a miss, never as a special value or a soft-stale hit.

use crate::errors::{AppError, AppResult};
use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory cache with LRU eviction and per-entry TTL
#[derive(Clone)]
pub struct InMemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

impl InMemoryCache {
    /// Fallback capacity when a caller passes zero entries
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create a cache bounded to `max_entries` live entries
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Look up a cached value; expired entries are evicted and reported as a
    /// miss
    ///
    /// # Errors
    ///
    /// Returns an error if a stored entry no longer deserializes.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut store = self.store.write().await;

        if let Some(entry) = store.get(key) {
            if entry.is_expired() {
                store.pop(key);
                return Ok(None);
            }

            let value = serde_json::from_slice(&entry.data)
                .map_err(|e| AppError::internal(format!("corrupt cache entry for {key}: {e}")))?;
            return Ok(Some(value));
        }

        Ok(None)
    }

    /// Store a value under `key` for `ttl`
    ///
    /// # Errors
    ///
    /// Returns an error if the value fails to serialize.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> AppResult<()> {
        let data = serde_json::to_vec(value)
            .map_err(|e| AppError::internal(format!("unserializable cache value: {e}")))?;

        // LruCache evicts the least-recently-used entry on push
        self.store
            .write()
            .await
            .push(key.to_string(), CacheEntry::new(data, ttl));

        Ok(())
    }
}
