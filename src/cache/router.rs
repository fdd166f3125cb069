use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::Url;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{
    CacheError, CacheResult, CacheStorage, CachedResponse, DEFAULT_PRECACHE, FetchError,
    FetchRequest, Network, RoutingTable, Strategy, cache_name,
};

/// Where the router stands in its install/activate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not installed yet, or the last install failed.
    Pending,
    /// Precache populated, old stores not yet purged.
    Installed,
    /// Routing every request through the strategy table.
    Activated,
}

/// Routes requests between a versioned cache store and the network.
pub struct CacheRouter<S: CacheStorage, N: Network> {
    storage: Arc<S>,
    network: Arc<N>,
    rules: RoutingTable,
    origin: Url,
    cache_name: String,
    precache: Vec<String>,
    lifecycle: RwLock<Lifecycle>,
}

impl<S: CacheStorage, N: Network> CacheRouter<S, N> {
    /// Creates a router for the given backend origin and cache version.
    ///
    /// The FoodBot routing table and precache manifest are used unless
    /// overridden with [with_rules][wr] and [with_precache][wp].
    ///
    /// [wr]: Self::with_rules
    /// [wp]: Self::with_precache
    pub fn new(storage: S, network: N, origin: Url, version: u32) -> Self {
        Self {
            storage: Arc::new(storage),
            network: Arc::new(network),
            rules: RoutingTable::foodbot(),
            origin,
            cache_name: cache_name(version),
            precache: DEFAULT_PRECACHE.iter().map(|p| p.to_string()).collect(),
            lifecycle: RwLock::new(Lifecycle::Pending),
        }
    }

    pub fn with_rules(mut self, rules: RoutingTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_precache(mut self, paths: Vec<String>) -> Self {
        self.precache = paths;
        self
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_lifecycle(&self, state: Lifecycle) {
        *self.lifecycle.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Installs and, on success, activates immediately.
    pub async fn start(&self) -> CacheResult<()> {
        self.install().await?;
        self.activate().await
    }

    /// Keeps calling [start][Self::start] until it succeeds, sleeping `retry`
    /// between attempts. Returns the number of attempts made.
    pub async fn start_with_retry(&self, retry: Duration) -> u32 {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.start().await {
                Ok(()) => return attempts,
                Err(e) => {
                    warn!(
                        "Cache {} install attempt {} failed, passing requests through: {}",
                        self.cache_name, attempts, e
                    );
                    tokio::time::sleep(retry).await;
                }
            }
        }
    }

    /// Opens the current store and fills it with the precache manifest.
    ///
    /// All assets are fetched before anything is written: when a single fetch
    /// fails or answers with a non-success status, the install fails and the
    /// store is left as it was.
    pub async fn install(&self) -> CacheResult<()> {
        info!(
            "Installing cache {} with {} precached assets",
            self.cache_name,
            self.precache.len()
        );
        self.storage.open(&self.cache_name).await?;

        let mut join_set = JoinSet::new();
        for path in &self.precache {
            let url = self
                .origin
                .join(path)
                .map_err(|e| FetchError::InvalidUrl(format!("{path}: {e}")))?;
            let network = self.network.clone();

            join_set.spawn(async move {
                let request = FetchRequest::get(url);
                let result = network.fetch(&request).await;
                (request, result)
            });
        }

        let mut fetched = Vec::with_capacity(self.precache.len());
        while let Some(task_result) = join_set.join_next().await {
            let (request, result) = match task_result {
                Ok(done) => done,
                Err(e) => return Err(CacheError::Install(e.to_string())),
            };
            let response = result?;
            if !response.is_cacheable() {
                return Err(CacheError::PrecacheStatus {
                    url: request.url.to_string(),
                    status: response.status,
                });
            }
            if !response.is_shareable() {
                warn!("Not precaching private response for {}", request.url);
                continue;
            }
            fetched.push((request, response));
        }

        for (request, response) in &fetched {
            self.storage
                .put(&self.cache_name, request.cache_key(), response)
                .await?;
        }

        self.set_lifecycle(Lifecycle::Installed);
        info!("Cache {} installed", self.cache_name);
        Ok(())
    }

    /// Purges every store not named by the current version, then takes over
    /// request handling.
    pub async fn activate(&self) -> CacheResult<()> {
        for name in self.storage.keys().await? {
            if name != self.cache_name {
                info!("Deleting outdated cache {}", name);
                self.storage.delete(&name).await?;
            }
        }

        self.set_lifecycle(Lifecycle::Activated);
        info!("Cache {} activated", self.cache_name);
        Ok(())
    }

    /// Answers one intercepted request.
    ///
    /// Until activation every request goes straight to the network.
    pub async fn handle(&self, request: FetchRequest) -> CacheResult<CachedResponse> {
        if self.lifecycle() != Lifecycle::Activated {
            return Ok(self.network.fetch(&request).await?);
        }

        match self.rules.strategy_for(request.path()) {
            Strategy::NetworkOnly => Ok(self.network.fetch(&request).await?),
            Strategy::CacheFirst => self.cache_first(&request).await,
            Strategy::NetworkFirst => self.network_first(&request).await,
        }
    }

    async fn cache_first(&self, request: &FetchRequest) -> CacheResult<CachedResponse> {
        if let Some(cached) = self.cached(request).await {
            debug!("Cache hit for {}", request.url);
            return Ok(cached);
        }

        let response = self.network.fetch(request).await?;
        self.store(request, &response).await;
        Ok(response)
    }

    async fn network_first(&self, request: &FetchRequest) -> CacheResult<CachedResponse> {
        match self.network.fetch(request).await {
            Ok(response) => {
                self.store(request, &response).await;
                Ok(response)
            }
            Err(e) => {
                warn!("Network request for {} failed: {}", request.url, e);
                match self.cached(request).await {
                    Some(cached) => {
                        debug!("Serving cached fallback for {}", request.url);
                        Ok(cached)
                    }
                    None => Err(e.into()),
                }
            }
        }
    }

    /// A store failure counts as a miss.
    async fn cached(&self, request: &FetchRequest) -> Option<CachedResponse> {
        if !request.is_get() {
            return None;
        }

        match self
            .storage
            .lookup(&self.cache_name, request.cache_key())
            .await
        {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Cache lookup for {} failed: {}", request.url, e);
                None
            }
        }
    }

    /// Best effort: write failures are logged, never returned.
    ///
    /// The store is shared by every client, so only anonymous GETs answered
    /// with a shareable `200` are kept.
    async fn store(&self, request: &FetchRequest, response: &CachedResponse) {
        if !request.is_get() || !response.is_cacheable() {
            return;
        }
        if request.has_credentials() || !response.is_shareable() {
            debug!("Not caching private response for {}", request.url);
            return;
        }

        if let Err(e) = self
            .storage
            .put(&self.cache_name, request.cache_key(), response)
            .await
        {
            warn!("Failed to cache {}: {}", request.url, e);
        }
    }
}
