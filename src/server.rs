pub mod errors;
pub mod handlers;

use std::sync::Arc;

use axum::{Router, routing::get};
use color_eyre::eyre::{Context, Result};
use reqwest::Url;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::{CacheRouter, CacheStorage, Network};
use crate::config::ServerConfig;
use handlers::{health::health_check, proxy::proxy_handler};

/// State shared by the edge handlers.
pub struct AppState<S: CacheStorage, N: Network> {
    pub router: Arc<CacheRouter<S, N>>,
    pub upstream: Url,
}

impl<S: CacheStorage, N: Network> Clone for AppState<S, N> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            upstream: self.upstream.clone(),
        }
    }
}

/// The edge proxy: `/health` plus every other path routed through the cache.
pub struct Server {
    router: Router,
    listener: TcpListener,
}

impl Server {
    /// Binds the listener and assembles the router.
    ///
    /// Port `0` binds a random free port, see [port][Self::port].
    pub async fn new<S: CacheStorage, N: Network>(
        cache_router: Arc<CacheRouter<S, N>>,
        config: &ServerConfig,
    ) -> Result<Self> {
        let trace_layer =
            TraceLayer::new_for_http().make_span_with(|request: &'_ axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("request", method = %request.method(), uri)
            });

        let state = AppState {
            upstream: cache_router.origin().clone(),
            router: cache_router,
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .fallback(proxy_handler::<S, N>)
            .layer(CorsLayer::permissive())
            .layer(trace_layer)
            .with_state(state);

        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Binding TCP listener on {addr}"))?;

        Ok(Self { router, listener })
    }

    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or_default()
    }

    pub async fn run(self) -> Result<()> {
        tracing::info!("Edge proxy listening on port {}", self.port());
        axum::serve(self.listener, self.router.into_make_service())
            .await
            .context("Running edge proxy")
    }
}
