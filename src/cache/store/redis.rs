use crate::cache::{
    CachedResponse,
    store::{CacheStorage, Result},
};
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

const DEFAULT_NAMESPACE: &str = "foodbot";

/// A Redis cache storage.
///
/// Each store is a hash (`<ns>:cache:<name>`) mapping URLs to JSON encoded
/// responses. The set `<ns>:caches` indexes the store names.
#[derive(Clone)]
pub struct RedisCacheStorage {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisCacheStorage {
    /// Creates a new Redis storage from a connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Keeps several deployments apart on a shared Redis instance.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    fn index_key(&self) -> String {
        format!("{}:caches", self.namespace)
    }

    fn cache_key(&self, cache_name: &str) -> String {
        format!("{}:cache:{}", self.namespace, cache_name)
    }
}

#[async_trait]
impl CacheStorage for RedisCacheStorage {
    async fn open(&self, cache_name: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.sadd(self.index_key(), cache_name).await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut names: Vec<String> = conn.smembers(self.index_key()).await?;
        names.sort();
        Ok(names)
    }

    async fn delete(&self, cache_name: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let (removed, _): (usize, usize) = redis::pipe()
            .atomic()
            .srem(self.index_key(), cache_name)
            .del(self.cache_key(cache_name))
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }

    async fn put(&self, cache_name: &str, url: &str, response: &CachedResponse) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(response)?;
        let _: () = redis::pipe()
            .atomic()
            .sadd(self.index_key(), cache_name)
            .ignore()
            .hset(self.cache_key(cache_name), url, json)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn lookup(&self, cache_name: &str, url: &str) -> Result<Option<CachedResponse>> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.hget(self.cache_key(cache_name), url).await?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn entry_count(&self, cache_name: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        let count: usize = conn.hlen(self.cache_key(cache_name)).await?;
        Ok(count)
    }
}
