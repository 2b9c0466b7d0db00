//! Configuration types and loader
//!
//! Handles loading configuration from TOML files, environment variables,
//! and built-in defaults, merged with Figment. Environment variables use
//! the `VENDHUB_` prefix with double-underscore-separated nested keys
//! (e.g. `VENDHUB_CACHE__REDIS_URL`, `VENDHUB_DATA_SOURCES__DEFAULT_URL`).

use crate::error::{Error, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default TTL applied when neither the call site nor the configuration
/// provides one (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Root namespace for every cache key written by this process
pub const CACHE_KEY_NAMESPACE: &str = "vendhub";

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache enabled
    pub enabled: bool,

    /// Redis URL; empty means the in-process emulation is used
    pub redis_url: Option<String>,

    /// Default TTL in seconds for entries stored without an explicit TTL
    pub default_ttl_secs: u64,

    /// Namespace prepended to every cache key
    pub namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redis_url: None,
            default_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            namespace: CACHE_KEY_NAMESPACE.to_string(),
        }
    }
}

/// Relational data-source configuration
///
/// Each business domain may point at its own database; any domain without
/// an explicit URL falls back to `default_url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSourcesConfig {
    /// Shared fallback connection URL
    pub default_url: String,

    /// Auth domain connection URL
    pub auth_url: Option<String>,

    /// Machines domain connection URL
    pub machines_url: Option<String>,

    /// Inventory domain connection URL
    pub inventory_url: Option<String>,

    /// Tasks domain connection URL
    pub tasks_url: Option<String>,

    /// Shared reference-data connection URL
    pub shared_url: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "vendhub_cache=debug")
    pub level: String,

    /// Emit JSON-formatted log lines
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cache layer configuration
    pub cache: CacheConfig,

    /// Relational data sources
    pub data_sources: DataSourcesConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Environment variable prefix for configuration overrides
const CONFIG_ENV_PREFIX: &str = "VENDHUB";

/// Configuration loader service
#[derive(Clone, Default)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration from all sources
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (if present)
    /// 3. `VENDHUB_`-prefixed environment variables (double underscore
    ///    separating nested keys, since field names contain underscores)
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                tracing::info!("Loaded configuration file: {}", config_path.display());
            } else {
                tracing::warn!(
                    "Configuration file not found, using defaults: {}",
                    config_path.display()
                );
            }
        }

        figment = figment.merge(Env::prefixed(&format!("{CONFIG_ENV_PREFIX}_")).split("__"));

        let app_config: AppConfig = figment.extract().map_err(|e| Error::Config {
            message: "Failed to extract configuration".to_string(),
            source: Some(Box::new(e)),
        })?;

        Self::validate(&app_config)?;

        Ok(app_config)
    }

    fn validate(config: &AppConfig) -> Result<()> {
        if config.cache.namespace.is_empty() {
            return Err(Error::config("cache.namespace must not be empty"));
        }
        if let Some(url) = &config.cache.redis_url {
            if !url.is_empty() && !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(Error::config(format!(
                    "cache.redis_url must be a redis:// URL, got '{url}'"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_local_emulation() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert!(config.redis_url.is_none());
        assert_eq!(config.default_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert_eq!(config.namespace, "vendhub");
    }

    #[test]
    fn load_without_file_yields_defaults() {
        let config = ConfigLoader::new().load().expect("defaults should load");
        assert!(config.cache.enabled);
        assert!(config.data_sources.auth_url.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn invalid_redis_url_is_rejected() {
        let mut config = AppConfig::default();
        config.cache.redis_url = Some("http://localhost:6379".to_string());
        assert!(ConfigLoader::validate(&config).is_err());
    }
}
