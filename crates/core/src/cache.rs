//! In-memory cache with a fixed time-to-live

use crate::clock::Clock;
use crate::config::CacheConfig;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at_ms: i64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Keyed cache whose entries expire a fixed TTL after they were written.
///
/// The cache is an explicit value owned by whoever builds it; there is no
/// process-wide instance. Time comes from the injected [`Clock`].
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            clock,
        }
    }

    /// Create a cache using the configured TTL
    pub fn from_config(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.ttl(), clock)
    }

    /// Get a live entry, evicting it if it has expired
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now_millis();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        None
    }

    pub async fn set(&self, key: K, value: V) {
        let expires_at_ms = self.clock.now_millis().saturating_add(self.ttl_ms);
        self.entries.write().await.insert(
            key,
            CacheEntry {
                value,
                expires_at_ms,
            },
        );
    }

    /// Drop a single entry. Returns whether anything was removed.
    pub async fn invalidate(&self, key: &K) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of entries currently held, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
