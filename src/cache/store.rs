use ::redis::RedisError;
use async_trait::async_trait;
use color_eyre::Report;
use std::error::Error as StdError;
use std::fmt;

use super::CachedResponse;

mod memory;
mod redis;

pub use memory::MemoryCacheStorage;
pub use redis::RedisCacheStorage;

type Result<T> = std::result::Result<T, CacheStoreError>;

/// Error type for cache store operations.
#[derive(Debug)]
pub struct CacheStoreError {
    error: Report,
}

impl CacheStoreError {
    pub fn new<T>(error: T) -> Self
    where
        T: StdError + Send + Sync + 'static,
    {
        Self {
            error: Report::new(error),
        }
    }

    pub fn msg<T>(message: T) -> Self
    where
        T: fmt::Debug + fmt::Display + Send + Sync + 'static,
    {
        Self {
            error: Report::msg(message),
        }
    }
}

impl StdError for CacheStoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.error.source()
    }
}

impl fmt::Display for CacheStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl From<RedisError> for CacheStoreError {
    fn from(error: RedisError) -> Self {
        Self::new(error)
    }
}

impl From<serde_json::Error> for CacheStoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error)
    }
}

/// Abstract interface for named, versioned response stores.
///
/// A backend holds any number of stores, each mapping a request URL to a
/// buffered response.
#[async_trait]
pub trait CacheStorage: Send + Sync + 'static {
    /// Creates the named store if it does not exist yet.
    async fn open(&self, cache_name: &str) -> Result<()>;

    /// Lists the names of all existing stores.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Deletes a store and all of its entries.
    ///
    /// Returns `false` when no store with that name existed.
    async fn delete(&self, cache_name: &str) -> Result<bool>;

    /// Stores a response under the given URL, creating the store if needed.
    ///
    /// An existing entry for the same URL is replaced.
    async fn put(&self, cache_name: &str, url: &str, response: &CachedResponse) -> Result<()>;

    /// Looks up the response stored under the given URL.
    async fn lookup(&self, cache_name: &str, url: &str) -> Result<Option<CachedResponse>>;

    /// Returns the number of entries held by a store.
    async fn entry_count(&self, cache_name: &str) -> Result<usize>;
}
