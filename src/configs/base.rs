use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::configs::*;

const CONFIG_CANDIDATES: &[&str] = &["config.toml", "config.default.toml"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub proxies: ProxiesConfig,
    #[serde(default)]
    pub youtube: YouTubeConfig,
}

impl Config {
    /// Loads the first config file found, falling back to built-in defaults,
    /// then applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match CONFIG_CANDIDATES.iter().find(|p| Path::new(p).exists()) {
            Some(path) => {
                crate::log_println!("Loading configuration from: {}", path);
                Self::from_file(path)?
            }
            None => {
                crate::log_println!("No config.toml found, using built-in defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(path, &raw)
    }

    fn from_toml(path: &str, raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Applies `PORT`, `CACHE_TTL_SECS`, `PROXY_REFRESH_INTERVAL_SECS`,
    /// `MAX_RESOLVE_ATTEMPTS` and `PROXY_CACHE_FILE`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
            let value = value?;
            match value.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    crate::log_println!("Ignoring {}={:?}: not a valid number", key, value);
                    None
                }
            }
        }

        if let Some(port) = parsed("PORT", lookup("PORT")) {
            self.server.port = port;
        }
        if let Some(ttl) = parsed("CACHE_TTL_SECS", lookup("CACHE_TTL_SECS")) {
            self.cache.ttl_secs = ttl;
        }
        if let Some(interval) = parsed(
            "PROXY_REFRESH_INTERVAL_SECS",
            lookup("PROXY_REFRESH_INTERVAL_SECS"),
        ) {
            self.proxies.refresh_interval_secs = interval;
        }
        if let Some(attempts) = parsed("MAX_RESOLVE_ATTEMPTS", lookup("MAX_RESOLVE_ATTEMPTS")) {
            self.resolver.max_attempts = attempts;
        }
        if let Some(path) = lookup("PROXY_CACHE_FILE").filter(|p| !p.trim().is_empty()) {
            self.proxies.cache_file = path;
        }
    }
}
