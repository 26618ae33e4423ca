use crate::*;

use std::sync::{PoisonError, RwLock};

/// In-process cache storage, clones share the same caches
#[derive(Clone, Default)]
pub struct MemoryStorage {
    caches: Arc<RwLock<Vec<(String, MemoryCache)>>>,
}

/// Entries are kept in insertion order
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<Vec<(CacheKey, CachedResponse)>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg_attr(host, async_trait)]
#[cfg_attr(sw, async_trait(?Send))]
impl CacheStorage for MemoryStorage {
    type Cache = MemoryCache;

    async fn open(&self, name: &str) -> Result<MemoryCache> {
        let mut caches = self.caches.write().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, cache)) = caches.iter().find(|(n, _)| n == name) {
            return Ok(cache.clone());
        }
        let cache = MemoryCache::default();
        caches.push((name.to_owned(), cache.clone()));
        Ok(cache)
    }

    async fn has(&self, name: &str) -> Result<bool> {
        let caches = self.caches.read().unwrap_or_else(PoisonError::into_inner);
        Ok(caches.iter().any(|(n, _)| n == name))
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let mut caches = self.caches.write().unwrap_or_else(PoisonError::into_inner);
        let before = caches.len();
        caches.retain(|(n, _)| n != name);
        Ok(caches.len() != before)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let caches = self.caches.read().unwrap_or_else(PoisonError::into_inner);
        Ok(caches.iter().map(|(name, _)| name.clone()).collect())
    }
}

#[cfg_attr(host, async_trait)]
#[cfg_attr(sw, async_trait(?Send))]
impl Cache for MemoryCache {
    async fn lookup(&self, key: &CacheKey) -> Result<Option<CachedResponse>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, response)| response.clone()))
    }

    async fn put_all(&self, new_entries: Vec<(CacheKey, CachedResponse)>) -> Result {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for (key, response) in new_entries {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = response,
                None => entries.push((key, response)),
            }
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<CacheKey>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.iter().map(|(key, _)| key.clone()).collect())
    }
}
