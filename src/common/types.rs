/// A generic boxed error type.
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// A convenient Result alias returning `AnyError`.
pub type AnyResult<T> = std::result::Result<T, AnyError>;

/// Address of an HTTP relay, e.g. `http://203.0.113.7:8080`.
///
/// Equality is exact string match; no normalisation is applied beyond what
/// the constructors do.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ProxyEndpoint(String);

impl ProxyEndpoint {
    /// Builds `{scheme}://{host}:{port}`.
    pub fn from_parts(scheme: &str, host: &str, port: &str) -> Self {
        Self(format!("{}://{}:{}", scheme, host.trim(), port.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Outbound transport for reqwest that routes every scheme through this relay.
    pub fn to_reqwest(&self) -> reqwest::Result<reqwest::Proxy> {
        reqwest::Proxy::all(self.as_str())
    }
}

impl From<String> for ProxyEndpoint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProxyEndpoint {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::ops::Deref for ProxyEndpoint {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
