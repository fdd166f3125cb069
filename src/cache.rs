//! Versioned response cache in front of the FoodBot backend.
//!
//! Every request coming through the edge proxy is routed by path to one of
//! three strategies (see [`RoutingTable`]):
//!
//! - live data (`/api/`, `/rfid_scan`, `/kitchen/data`, `/menu/data`) always
//!   goes to the network and never touches the cache,
//! - static assets (`/static/`) are served cache-first,
//! - everything else is served network-first with a cached fallback.
//!
//! The cache store is named after a version (`foodbot-v<n>`). Bumping the
//! version and restarting the proxy is the only way stale assets are dropped:
//! [`CacheRouter::activate`] deletes every store not named by the current
//! version.

mod entry;
mod errors;
pub mod network;
mod router;
mod rules;
pub mod store;

pub use entry::{CachedResponse, FetchRequest};
pub use errors::{CacheError, CacheResult, FetchError};
pub use network::{HttpNetwork, Network};
pub use router::{CacheRouter, Lifecycle};
pub use rules::{PathMatcher, Rule, RoutingTable, Strategy};
pub use store::{CacheStorage, CacheStoreError, MemoryCacheStorage, RedisCacheStorage};

/// Prefix shared by every cache store name.
pub const CACHE_PREFIX: &str = "foodbot-v";

/// Critical assets fetched into the store on install.
pub const DEFAULT_PRECACHE: &[&str] = &[
    "/static/css/base.css",
    "/static/css/components.css",
    "/static/css/layouts.css",
    "/static/css/pages/mobile.css",
    "/static/icons/icon-192.png",
    "/static/icons/icon-512.png",
];

/// Returns the store name for a cache version, e.g. `foodbot-v3`.
pub fn cache_name(version: u32) -> String {
    format!("{CACHE_PREFIX}{version}")
}
