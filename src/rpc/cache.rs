use std::{collections::HashMap, time::Duration};

use tokio::{sync::RwLock, time::Instant};

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Time-boxed store keyed by logical query.
///
/// An entry past its expiry reads as absent. Nothing is evicted: a stale
/// entry stays until the next `set` for the same key overwrites it.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").finish_non_exhaustive()
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    /// Number of stored entries, expired ones included.
    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    #[cfg(test)]
    async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
