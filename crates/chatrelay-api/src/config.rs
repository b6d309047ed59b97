use std::path::Path;
use std::time::Duration;

use chatrelay_backend::{GenerationClientConfig, LookupClientConfig};
use chatrelay_relay::RetryPolicy;
use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub mongodb: MongoDbConfig,
    pub backend: BackendConfig,
    pub lookup: LookupConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Mongodb,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub kind: StorageKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    pub timeout_ms: u64,
}

fn default_database() -> String {
    "UserChats".to_string()
}

fn default_collection() -> String {
    "sessions".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub generation_url: String,
    #[serde(default)]
    pub health_url: Option<String>,
    pub timeout_ms: u64,
    pub health_timeout_ms: u64,
}

impl From<&BackendConfig> for GenerationClientConfig {
    fn from(config: &BackendConfig) -> Self {
        let client = GenerationClientConfig::new(config.generation_url.clone())
            .with_timeout(Duration::from_millis(config.timeout_ms))
            .with_health_timeout(Duration::from_millis(config.health_timeout_ms));
        match config.health_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => client.with_health_url(url),
            None => client,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
    pub timeout_ms: u64,
}

impl From<&LookupConfig> for LookupClientConfig {
    fn from(config: &LookupConfig) -> Self {
        LookupClientConfig::new(config.url.clone())
            .with_timeout(Duration::from_millis(config.timeout_ms))
    }
}

/// Bot-turn persistence retries after a successful generation
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub bot_turn_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bot_turn_retries: 2,
            retry_backoff_ms: 100,
        }
    }
}

impl From<&RelayConfig> for RetryPolicy {
    fn from(config: &RelayConfig) -> Self {
        RetryPolicy::new(config.bot_turn_retries, Duration::from_millis(config.retry_backoff_ms))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables, `CHATRELAY_<SECTION>__<KEY>`
    ///    (e.g. `CHATRELAY_BACKEND__GENERATION_URL`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("CHATRELAY")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.origins")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets are never read from TOML
        if cfg.storage.kind == StorageKind::Mongodb {
            cfg.mongodb_uri = std::env::var("MONGODB_URI").map_err(|_| {
                ConfigError::Message("MONGODB_URI environment variable is required".to_string())
            })?;
        }

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));
        builder.build()?.try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}
