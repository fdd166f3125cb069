use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use reqwest::{Client, redirect::Policy};
use tokio::time::timeout;
use tracing::debug;

use super::entry::is_forwardable;
use super::{CachedResponse, FetchError, FetchRequest};

/// The path a request takes when it is not answered from the cache.
#[async_trait]
pub trait Network: Send + Sync + 'static {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse, FetchError>;
}

/// Forwards requests to the backend with `reqwest`.
///
/// Redirects are handed back to the caller untouched.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: Client,
    request_timeout: Option<Duration>,
}

impl HttpNetwork {
    pub fn new(request_timeout: Option<Duration>) -> Result<Self, FetchError> {
        let client = Client::builder().redirect(Policy::none()).build()?;
        Ok(Self {
            client,
            request_timeout,
        })
    }

    fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
        headers
            .iter()
            .filter(|(name, _)| is_forwardable(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse, FetchError> {
        debug!("{} {}", request.method, request.url);

        let send = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(Self::forwarded_headers(&request.headers))
            .body(request.body.clone())
            .send();

        let response = match self.request_timeout {
            Some(limit) => match timeout(limit, send).await {
                Ok(result) => result?,
                Err(_) => return Err(FetchError::Timeout(request.url.to_string())),
            },
            None => send.await?,
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(CachedResponse::from_parts(status, &headers, body))
    }
}
