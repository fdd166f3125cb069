use thiserror::Error;

use super::store::CacheStoreError;

/// Errors raised while talking to the backend.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timeout while fetching {0}")]
    Timeout(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors returned by the cache router.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Network request failed: {0}")]
    Network(#[from] FetchError),

    #[error("Cache store error: {0}")]
    Store(#[from] CacheStoreError),

    #[error("Install aborted: {0}")]
    Install(String),

    #[error("Precaching {url} failed with status {status}")]
    PrecacheStatus { url: String, status: u16 },
}

impl CacheError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CacheError::Network(FetchError::Timeout(_)))
    }
}

/// Convenient Result type alias
pub type CacheResult<T> = Result<T, CacheError>;
