use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A remote listing of candidate relays.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProxySourceConfig {
    /// An HTML page with an `ip | port | .. | https` table, free-proxy-list style.
    HtmlTable { url: String },
    /// One `host:port` per line.
    PlainText {
        url: String,
        #[serde(default = "default_scheme")]
        scheme: String,
    },
}

impl ProxySourceConfig {
    pub fn url(&self) -> &str {
        match self {
            Self::HtmlTable { url } | Self::PlainText { url, .. } => url,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProxiesConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_enabled")]
    pub refresh_on_start: bool,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_validation_url")]
    pub validation_url: String,
    #[serde(default = "default_validation_timeout_secs")]
    pub validation_timeout_secs: u64,
    #[serde(default = "default_validation_concurrency")]
    pub validation_concurrency: usize,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default = "default_sources")]
    pub sources: Vec<ProxySourceConfig>,
}

fn default_enabled() -> bool {
    true
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_cache_file() -> String {
    "working_proxies.json".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    600
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_validation_url() -> String {
    "https://httpbin.org/ip".to_string()
}

fn default_validation_timeout_secs() -> u64 {
    5
}

fn default_validation_concurrency() -> usize {
    32
}

fn default_max_candidates() -> usize {
    300
}

fn default_sources() -> Vec<ProxySourceConfig> {
    vec![
        ProxySourceConfig::HtmlTable {
            url: "https://free-proxy-list.net/".to_string(),
        },
        ProxySourceConfig::PlainText {
            url: "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/http.txt"
                .to_string(),
            scheme: default_scheme(),
        },
    ]
}

impl ProxiesConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn validation_timeout(&self) -> Duration {
        Duration::from_secs(self.validation_timeout_secs)
    }
}

impl Default for ProxiesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            cache_file: default_cache_file(),
            refresh_interval_secs: default_refresh_interval_secs(),
            refresh_on_start: default_enabled(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            validation_url: default_validation_url(),
            validation_timeout_secs: default_validation_timeout_secs(),
            validation_concurrency: default_validation_concurrency(),
            max_candidates: default_max_candidates(),
            sources: default_sources(),
        }
    }
}
