pub mod clients;
pub mod formats;
pub mod music;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

pub use self::{clients::PlayerClient, music::YouTubeMusicClient};
use crate::{
    common::{http::HttpClient, types::ProxyEndpoint},
    configs::YouTubeConfig,
    sources::plugin::{ExtractionError, StreamExtractor},
};

/// Resolves a video id to a raw audio stream URL through an InnerTube
/// `player` request.
pub struct YouTubeExtractor {
    client: PlayerClient,
    hl: String,
    gl: String,
    timeout: Duration,
    api_base: String,
    direct: reqwest::Client,
}

impl YouTubeExtractor {
    pub fn new(config: &YouTubeConfig, timeout: Duration) -> reqwest::Result<Self> {
        let client = PlayerClient::from_name(&config.player_client);
        let direct = HttpClient::builder(client.user_agent().to_string(), timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            hl: config.hl.clone(),
            gl: config.gl.clone(),
            timeout,
            api_base: clients::INNERTUBE_API.to_string(),
            direct,
        })
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn http_for(&self, proxy: Option<&ProxyEndpoint>) -> Result<reqwest::Client, ExtractionError> {
        let Some(proxy) = proxy else {
            return Ok(self.direct.clone());
        };

        let invalid = |source| ExtractionError::InvalidProxy {
            proxy: proxy.to_string(),
            source,
        };
        let relay = proxy.to_reqwest().map_err(invalid)?;
        HttpClient::builder(self.client.user_agent().to_string(), self.timeout)
            .proxy(relay)
            .build()
            .map_err(invalid)
    }

    async fn player_request(
        &self,
        http: &reqwest::Client,
        video_id: &str,
    ) -> Result<Value, ExtractionError> {
        let body = json!({
            "context": self.client.context(&self.hl, &self.gl),
            "videoId": video_id,
            "contentCheckOk": true,
            "racyCheckOk": true
        });

        let url = format!("{}/youtubei/v1/player?prettyPrint=false", self.api_base);
        let res = http
            .post(&url)
            .header("X-YouTube-Client-Name", self.client.id())
            .header("X-YouTube-Client-Version", self.client.version())
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ExtractionError::Status(status));
        }

        Ok(res.json().await?)
    }
}

#[async_trait]
impl StreamExtractor for YouTubeExtractor {
    async fn extract(
        &self,
        video_id: &str,
        proxy: Option<&ProxyEndpoint>,
    ) -> Result<Option<String>, ExtractionError> {
        let http = self.http_for(proxy)?;
        let response = self.player_request(&http, video_id).await?;

        let streaming_data = formats::streaming_data(&response)?;
        let format = formats::select_best_audio_format(streaming_data)
            .ok_or(ExtractionError::NoAudioFormat)?;

        let url = formats::direct_url(format);
        if url.is_none() {
            tracing::debug!(
                "{}: format itag {} has no direct url",
                video_id,
                format.get("itag").and_then(|v| v.as_i64()).unwrap_or(-1)
            );
        }
        Ok(url)
    }
}
