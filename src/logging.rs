//! Structured logging with tracing
//!
//! Configures structured logging for the cache and data-access layer using
//! the tracing ecosystem. Log level comes from `VENDHUB_LOG` when set,
//! otherwise from the provided configuration.

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Initialize logging with the provided configuration
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_env("VENDHUB_LOG").unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = if config.json_format {
        let stdout = fmt::layer().json().with_target(true);
        Registry::default().with(filter).with(stdout).try_init()
    } else {
        let stdout = fmt::layer().with_target(true);
        Registry::default().with(filter).with(stdout).try_init()
    };

    result.map_err(|e| Error::Config {
        message: "Failed to initialize logging".to_string(),
        source: Some(Box::new(e)),
    })
}
