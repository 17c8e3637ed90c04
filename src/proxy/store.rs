use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::common::types::ProxyEndpoint;

#[derive(Debug, thiserror::Error)]
pub enum ProxyStoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed proxy snapshot {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON snapshot of the working set: `["http://ip:port", ...]`.
///
/// Both directions are best-effort: callers get an empty list or a logged
/// warning, never an error.
#[derive(Debug, Clone)]
pub struct ProxyStore {
    path: PathBuf,
}

impl ProxyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Vec<ProxyEndpoint> {
        match self.try_load() {
            Ok(Some(proxies)) => {
                info!(
                    "Loaded {} cached proxies from {}",
                    proxies.len(),
                    self.path.display()
                );
                proxies
            }
            Ok(None) => {
                info!("No cached proxy file found at {}", self.path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("Ignoring cached proxies: {}", e);
                Vec::new()
            }
        }
    }

    pub fn save<'a, I>(&self, proxies: I)
    where
        I: IntoIterator<Item = &'a ProxyEndpoint>,
    {
        let mut sorted: Vec<&ProxyEndpoint> = proxies.into_iter().collect();
        sorted.sort();

        match self.try_save(&sorted) {
            Ok(()) => debug!(
                "Saved {} working proxies to {}",
                sorted.len(),
                self.path.display()
            ),
            Err(e) => warn!("Failed to persist working proxies: {}", e),
        }
    }

    fn try_load(&self) -> Result<Option<Vec<ProxyEndpoint>>, ProxyStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProxyStoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| ProxyStoreError::Malformed {
                path: self.path.clone(),
                source,
            })
    }

    /// Writes to a sibling temp file and renames it over the snapshot so a
    /// crash mid-write never leaves a truncated file behind.
    fn try_save(&self, proxies: &[&ProxyEndpoint]) -> Result<(), ProxyStoreError> {
        let io_err = |source| ProxyStoreError::Io {
            path: self.path.clone(),
            source,
        };

        let body = serde_json::to_vec(proxies).map_err(|source| ProxyStoreError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(&body).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn endpoints(list: &[&str]) -> Vec<ProxyEndpoint> {
        list.iter().map(|p| ProxyEndpoint::from(*p)).collect()
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("working_proxies.json");
        let saved = endpoints(&["http://10.0.0.2:3128", "http://10.0.0.1:8080"]);

        ProxyStore::new(&path).save(&saved);
        let loaded = ProxyStore::new(&path).load();

        let expected: HashSet<_> = saved.into_iter().collect();
        let actual: HashSet<_> = loaded.into_iter().collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_snapshot_is_a_sorted_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("working_proxies.json");

        ProxyStore::new(&path).save(&endpoints(&["http://b:2", "http://a:1"]));

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"["http://a:1","http://b:2"]"#);
        assert!(!dir.path().join("working_proxies.json.tmp").exists());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let store = ProxyStore::new(&path);
        assert_eq!(store.path(), path.as_path());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("working_proxies.json");
        fs::write(&path, "{not json").unwrap();
        assert!(ProxyStore::new(&path).load().is_empty());

        fs::write(&path, r#"{"proxies": []}"#).unwrap();
        assert!(ProxyStore::new(&path).load().is_empty());
    }

    #[test]
    fn test_save_into_missing_directory_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProxyStore::new(dir.path().join("no/such/dir/proxies.json"));
        store.save(&endpoints(&["http://a:1"]));
        assert!(store.load().is_empty());
    }
}
