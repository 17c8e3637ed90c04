use std::time::Duration;

use reqwest::{Client, Error};

use crate::common::types::ProxyEndpoint;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

pub struct HttpClient;

impl HttpClient {
    pub fn default_user_agent() -> String {
        DEFAULT_USER_AGENT.to_string()
    }

    /// Direct client with the shared user agent. System proxy variables are
    /// ignored.
    pub fn new(timeout: Duration) -> Result<Client, Error> {
        Self::builder(Self::default_user_agent(), timeout)
            .no_proxy()
            .build()
    }

    /// Client whose every request goes through `proxy`.
    pub fn via_proxy(proxy: &ProxyEndpoint, timeout: Duration) -> Result<Client, Error> {
        Self::builder(Self::default_user_agent(), timeout)
            .proxy(proxy.to_reqwest()?)
            .build()
    }

    /// Base builder. The connect timeout never exceeds the total timeout.
    pub fn builder(user_agent: String, timeout: Duration) -> reqwest::ClientBuilder {
        Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .tcp_nodelay(true)
            .pool_idle_timeout(Duration::from_secs(70))
    }
}
