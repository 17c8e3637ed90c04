//! Relay discovery, selection and persistence.
//!
//! [`ProxyPool`] is the only shared mutable state; [`RefreshScheduler`] is its
//! only background writer besides evictions coming from stream resolution.

pub mod fetcher;
pub mod pool;
pub mod scheduler;
pub mod store;

pub use fetcher::{ProxyFetcher, ProxySourceError, ProxySourceFetcher};
pub use pool::ProxyPool;
pub use scheduler::{RefreshHandle, RefreshScheduler, RefreshTrigger};
pub use store::{ProxyStore, ProxyStoreError};
