use std::sync::Arc;

use color_eyre::eyre::{Context, eyre};
use foodbot::{
    cache::{CacheRouter, CacheStorage, HttpNetwork, MemoryCacheStorage, RedisCacheStorage},
    config::Config,
    server::Server,
    telemetry,
};
use reqwest::Url;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    // Load configuration
    let config = Config::load()?;
    tracing::info!("Loaded configuration: {:?}", config);

    match &config.redis {
        Some(redis) => {
            let conn = redis
                .start()
                .await
                .context("Connecting to the Redis cache store")?;
            serve(RedisCacheStorage::new(conn), &config).await
        }
        None => serve(MemoryCacheStorage::new(), &config).await,
    }
}

async fn serve<S: CacheStorage>(storage: S, config: &Config) -> color_eyre::Result<()> {
    let origin = Url::parse(&config.upstream.base_url)
        .map_err(|e| eyre!("Invalid upstream URL {}: {e}", config.upstream.base_url))?;
    let network = HttpNetwork::new(config.upstream.timeout())?;

    let router = Arc::new(
        CacheRouter::new(storage, network, origin, config.cache.version)
            .with_precache(config.cache.precache.clone()),
    );

    // Requests pass through until the cache is installed.
    let retry = config.cache.install_retry();
    tokio::spawn({
        let router = router.clone();
        async move {
            let attempts = router.start_with_retry(retry).await;
            tracing::debug!("Cache ready after {} attempt(s)", attempts);
        }
    });

    let server = Server::new(router, &config.server).await?;
    server.run().await
}
