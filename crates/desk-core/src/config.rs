//! Configuration management for the trading session desk.
//!
//! Values are layered: built-in defaults, then an optional `desk.toml`
//! (or an explicit file), then `DESK_`-prefixed environment variables with
//! `__` separating nested keys (`DESK_API__BASE_URL`).

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Backend address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const ENV_PREFIX: &str = "DESK";
const DEFAULT_FILE: &str = "desk";

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load `.env` into the process environment, then the configuration.
    ///
    /// `path` replaces the default `desk.toml` when given.
    pub fn from_env(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load(path)
    }

    /// Load configuration, reading `path` instead of the default file when given.
    ///
    /// An explicit path must exist; the default `desk.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = ApiConfig::default();
        let mut builder = config::Config::builder()
            .set_default("api.base_url", defaults.base_url)?
            .set_default("api.timeout_secs", defaults.timeout_secs as i64)?
            .set_default("api.connect_timeout_secs", defaults.connect_timeout_secs as i64)?;

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::with_name(DEFAULT_FILE).required(false)),
        };

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Replace the backend address, e.g. from a command-line flag.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self> {
        self.api.base_url = base_url.into();
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| Error::Config {
            message: format!("api.base_url {:?} is not a valid URL: {}", self.api.base_url, e),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("api.base_url must use http or https, got {}", url.scheme()),
            });
        }

        if self.api.timeout_secs == 0 {
            return Err(Error::Config {
                message: "api.timeout_secs must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Configuration pointing at a local test backend.
    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                timeout_secs: 2,
                connect_timeout_secs: 1,
            },
        }
    }
}
