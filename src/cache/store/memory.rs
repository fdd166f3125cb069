use crate::cache::{
    CachedResponse,
    store::{CacheStorage, Result},
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

type Entries = DashMap<String, CachedResponse>;

/// An in-memory cache storage.
///
/// Contents are lost when the process exits, so every start repopulates the
/// store through install.
#[derive(Debug, Default, Clone)]
pub struct MemoryCacheStorage {
    caches: Arc<DashMap<String, Arc<Entries>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self, cache_name: &str) -> Arc<Entries> {
        self.caches
            .entry(cache_name.to_string())
            .or_default()
            .value()
            .clone()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, cache_name: &str) -> Result<()> {
        self.entries(cache_name);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.caches.iter().map(|c| c.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, cache_name: &str) -> Result<bool> {
        Ok(self.caches.remove(cache_name).is_some())
    }

    async fn put(&self, cache_name: &str, url: &str, response: &CachedResponse) -> Result<()> {
        self.entries(cache_name)
            .insert(url.to_string(), response.clone());
        Ok(())
    }

    async fn lookup(&self, cache_name: &str, url: &str) -> Result<Option<CachedResponse>> {
        // Clone the store handle first so no shard lock is held across both maps.
        let Some(entries) = self.caches.get(cache_name).map(|c| c.value().clone()) else {
            return Ok(None);
        };
        Ok(entries.get(url).map(|e| e.value().clone()))
    }

    async fn entry_count(&self, cache_name: &str) -> Result<usize> {
        Ok(self
            .caches
            .get(cache_name)
            .map(|c| c.value().len())
            .unwrap_or(0))
    }
}
