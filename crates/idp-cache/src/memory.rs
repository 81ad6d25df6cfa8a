//! In-memory TTL cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::CacheResult;
use crate::provider::CacheStore;

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-process cache with a single TTL fixed at construction.
///
/// Expiry is lazy: reads treat expired entries as missing, and writes sweep
/// out whatever has expired so long-lived processes do not accumulate dead
/// entries between reads.
pub struct MemoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Creates a cache whose entries live for `ttl` after each write.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    /// Whether the cache holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep(entries: &mut HashMap<String, Entry>, now: Instant) {
        entries.retain(|_, e| e.expires_at > now);
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn set(&self, key: &str, value: Vec<u8>) -> CacheResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        Self::sweep(&mut entries, now);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone()))
    }

    async fn take(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        Ok(entries.remove(key).filter(|e| e.expires_at > now).map(|e| e.value))
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.set("k", b"value".to_vec()).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some(&b"value"[..]));
    }

    #[tokio::test]
    async fn set_replaces_existing_entry() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.set("k", b"one".to_vec()).await.unwrap();
        cache.set("k", b"two".to_vec()).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some(&b"two"[..]));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_missing() {
        let cache = MemoryCache::new(Duration::from_millis(10));
        cache.set("k", b"value".to_vec()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.take("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn take_consumes_the_entry() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.set("k", b"value".to_vec()).await.unwrap();
        assert!(cache.take("k").await.unwrap().is_some());
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.set("k", b"value".to_vec()).await.unwrap();
        cache.delete("k").await.unwrap();
        cache.delete("k").await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_sweep_expired_entries() {
        let cache = MemoryCache::new(Duration::from_millis(10));
        cache.set("old", b"value".to_vec()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.set("new", b"value".to_vec()).await.unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_writers_keep_one_value_per_key() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        let mut handles = Vec::new();
        for n in 0..16u8 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.set("shared", vec![n]).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let value = cache.get("shared").await.unwrap().unwrap();
        assert_eq!(value.len(), 1);
    }

    #[tokio::test]
    async fn value_visible_after_set_returns() {
        // Session linearizability: a read from any task after set completes
        // must observe the written value.
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        cache.set("session", b"user".to_vec()).await.unwrap();
        let reader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get("session").await.unwrap() })
        };
        assert_eq!(reader.await.unwrap().as_deref(), Some(&b"user"[..]));
    }
}
