#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use foodbot::{
    cache::{CacheRouter, HttpNetwork, MemoryCacheStorage},
    config::Config,
    server::Server,
};
use reqwest::Url;
use tokio::net::TcpListener;

/// Serves `router` on a random local port and returns its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("failed to run backend");
    });

    format!("http://127.0.0.1:{port}")
}

/// A base URL nothing listens on.
pub async fn dead_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    format!("http://127.0.0.1:{port}")
}

// Helper function to spawn the edge proxy in front of `backend` on a random port
pub async fn spawn_edge(backend: &str, install: bool) -> String {
    let config = {
        let mut vars = HashMap::new();
        vars.insert("server.host".to_string(), "localhost".to_string());
        // Use a random OS port
        vars.insert("server.port".to_string(), "0".to_string());
        vars.insert("upstream.base_url".to_string(), backend.to_string());
        Config::load_with_sources(Some(vars)).unwrap()
    };

    let network = HttpNetwork::new(config.upstream.timeout()).unwrap();
    let router = CacheRouter::new(
        MemoryCacheStorage::new(),
        network,
        Url::parse(&config.upstream.base_url).unwrap(),
        config.cache.version,
    );
    if install {
        router.start().await.unwrap();
    }

    let server = Server::new(Arc::new(router), &config.server)
        .await
        .unwrap();

    let port = server.port();
    tokio::spawn(async move {
        server.run().await.expect("failed to run server");
    });

    format!("http://{}:{}", config.server.host, port)
}
