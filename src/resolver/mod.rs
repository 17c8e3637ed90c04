//! Bounded-retry stream resolution: cache, then rotating relays, then a
//! single direct attempt.

use std::{collections::HashSet, sync::Arc};

use crate::{
    cache::StreamCache,
    common::types::ProxyEndpoint,
    configs::ResolverConfig,
    proxy::ProxyPool,
    sources::StreamExtractor,
};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("could not resolve {video_id}: {reason}")]
    ResolutionFailed { video_id: String, reason: String },
}

/// Result of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Resolved(String),
    Failed(String),
}

pub struct StreamResolver {
    pool: Arc<ProxyPool>,
    cache: Arc<StreamCache>,
    extractor: Arc<dyn StreamExtractor>,
    max_attempts: usize,
}

impl StreamResolver {
    pub fn new(
        pool: Arc<ProxyPool>,
        cache: Arc<StreamCache>,
        extractor: Arc<dyn StreamExtractor>,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            pool,
            cache,
            extractor,
            max_attempts: config.max_attempts,
        }
    }

    async fn attempt(&self, video_id: &str, proxy: Option<&ProxyEndpoint>) -> AttemptOutcome {
        match self.extractor.extract(video_id, proxy).await {
            Ok(Some(url)) if !url.is_empty() => AttemptOutcome::Resolved(url),
            Ok(_) => AttemptOutcome::Failed("no stream url in response".to_string()),
            Err(e) => AttemptOutcome::Failed(e.to_string()),
        }
    }

    pub async fn resolve(&self, video_id: &str) -> Result<String, ResolveError> {
        if let Some(url) = self.cache.get(video_id) {
            tracing::debug!("{}: served from cache", video_id);
            return Ok(url);
        }

        let mut tried: HashSet<ProxyEndpoint> = HashSet::new();
        for attempt in 1..=self.max_attempts {
            let Some(proxy) = self.pool.get_proxy() else {
                tracing::debug!("{}: proxy pool is empty", video_id);
                break;
            };
            if !tried.insert(proxy.clone()) {
                break;
            }

            match self.attempt(video_id, Some(&proxy)).await {
                AttemptOutcome::Resolved(url) => {
                    tracing::info!("{}: resolved via {} (attempt {})", video_id, proxy, attempt);
                    self.cache.put(video_id, url.clone());
                    return Ok(url);
                }
                AttemptOutcome::Failed(reason) => {
                    tracing::warn!(
                        "{}: attempt {} via {} failed: {}",
                        video_id,
                        attempt,
                        proxy,
                        reason
                    );
                    self.pool.remove_proxy(&proxy);
                }
            }
        }

        tracing::info!("{}: falling back to a direct request", video_id);
        match self.attempt(video_id, None).await {
            AttemptOutcome::Resolved(url) => {
                self.cache.put(video_id, url.clone());
                Ok(url)
            }
            AttemptOutcome::Failed(reason) => {
                tracing::error!("{}: direct request failed: {}", video_id, reason);
                Err(ResolveError::ResolutionFailed {
                    video_id: video_id.to_string(),
                    reason,
                })
            }
        }
    }
}
