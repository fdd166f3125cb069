use std::{collections::HashMap, time::Duration};

use config::{Config as ConfigLib, ConfigError, Environment, File};
use redis::{
    Client as RedisClient, RedisResult,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_PRECACHE;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub kiosk: KioskConfig,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// The FoodBot backend the edge proxy forwards to.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub version: u32,
    pub precache: Vec<String>,
    /// Delay between install attempts while the backend is unreachable.
    pub install_retry_secs: u64,
}

impl CacheConfig {
    pub fn install_retry(&self) -> Duration {
        Duration::from_secs(self.install_retry_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KioskConfig {
    pub base_url: String,
    pub rfid_interval_ms: u64,
    pub menu_interval_ms: u64,
    pub status_display_ms: u64,
}

impl KioskConfig {
    /// Tickers cannot run with a zero period.
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("kiosk.rfid_interval_ms", self.rfid_interval_ms),
            ("kiosk.menu_interval_ms", self.menu_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Message(format!("{key} must be greater than 0")));
            }
        }
        Ok(())
    }

    pub fn rfid_interval(&self) -> Duration {
        Duration::from_millis(self.rfid_interval_ms)
    }

    pub fn menu_interval(&self) -> Duration {
        Duration::from_millis(self.menu_interval_ms)
    }

    pub fn status_display(&self) -> Duration {
        Duration::from_millis(self.status_display_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub uri: String,
}

impl RedisConfig {
    /// Establishes a new Redis connection based on the provided URI.
    ///
    /// - To enable TLS, the URI must use the `rediss://` scheme.
    /// - To enable insecure TLS, the URI must use the `rediss://` scheme and end with `/#insecure`.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn start(&self) -> RedisResult<ConnectionManager> {
        let client = RedisClient::open(self.uri.as_str())?;
        let config = ConnectionManagerConfig::new().set_connection_timeout(Duration::from_secs(60));
        client.get_connection_manager_with_config(config).await
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_sources(None)
    }

    pub fn load_with_sources(
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let precache: Vec<String> = DEFAULT_PRECACHE.iter().map(|p| p.to_string()).collect();

        let mut builder = ConfigLib::builder()
            .set_default("server.host", "localhost")?
            .set_default("server.port", 8080)?
            .set_default("upstream.base_url", "http://localhost:5000")?
            .set_default("cache.version", 1)?
            .set_default("cache.precache", precache)?
            .set_default("cache.install_retry_secs", 30)?
            .set_default("kiosk.base_url", "http://localhost:5000")?
            .set_default("kiosk.rfid_interval_ms", 500)?
            .set_default("kiosk.menu_interval_ms", 5000)?
            .set_default("kiosk.status_display_ms", 3000)?
            .add_source(File::with_name("config/settings").required(false));

        // If env_vars is provided, we use it instead of system environment
        // This is to avoid systems variables pollution across tests
        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = builder.set_override(&key, value)?;
            }
        } else {
            // Should be in the format APP_SERVER__HOST or APP_KIOSK__BASE_URL
            builder = builder.add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.kiosk.validate()?;
        Ok(config)
    }
}
