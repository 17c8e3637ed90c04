use async_trait::async_trait;
use serde::Serialize;

use crate::common::types::ProxyEndpoint;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("invalid proxy {proxy}: {source}")]
    InvalidProxy {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("player request returned {0}")]
    Status(reqwest::StatusCode),
    #[error("video is not playable: status={status}, reason={reason}")]
    Unplayable { status: String, reason: String },
    #[error("player response has no streamingData")]
    MissingStreamingData,
    #[error("no suitable audio format")]
    NoAudioFormat,
}

/// Turns a media identifier into a raw stream URL, optionally through a relay.
///
/// `Ok(None)` means the platform answered but exposed no directly usable URL.
#[async_trait]
pub trait StreamExtractor: Send + Sync {
    async fn extract(
        &self,
        video_id: &str,
        proxy: Option<&ProxyEndpoint>,
    ) -> Result<Option<String>, ExtractionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog request returned {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongSummary {
    pub title: Option<String>,
    pub artist: String,
    pub video_id: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Chart {
    pub tracks: Vec<SongSummary>,
}

/// Catalog lookups. Always performed directly, never through the relay pool.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn search_songs(&self, query: &str) -> Result<Vec<SongSummary>, MetadataError>;

    /// Best song match for a free-text query.
    async fn search_metadata(&self, query: &str) -> Result<Option<SongSummary>, MetadataError> {
        let query = query.trim().to_lowercase();
        Ok(self.search_songs(&query).await?.into_iter().next())
    }

    async fn trending(&self) -> Result<Chart, MetadataError>;
}
