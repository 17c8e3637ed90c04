use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::clients::{MUSIC_API, web_remix};
use crate::{
    common::http::HttpClient,
    configs::YouTubeConfig,
    sources::plugin::{Chart, MetadataError, MetadataProvider, SongSummary},
};

/// `params` value restricting a music search to songs.
const SONGS_FILTER: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";
const CHARTS_BROWSE_ID: &str = "FEmusic_charts";
const ARTIST_PAGE_TYPE: &str = "MUSIC_PAGE_TYPE_ARTIST";

const PAGE_TYPE_PATH: &str = concat!(
    "/navigationEndpoint/browseEndpoint/browseEndpointContextSupportedConfigs",
    "/browseEndpointContextMusicConfig/pageType"
);
const OVERLAY_VIDEO_ID_PATH: &str = concat!(
    "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer",
    "/playNavigationEndpoint/watchEndpoint/videoId"
);

/// Catalog client over the WEB_REMIX InnerTube API. Always direct.
pub struct YouTubeMusicClient {
    http: reqwest::Client,
    hl: String,
    gl: String,
    api_base: String,
}

impl YouTubeMusicClient {
    pub fn new(config: &YouTubeConfig, timeout: Duration) -> reqwest::Result<Self> {
        let http = HttpClient::builder(web_remix::USER_AGENT.to_string(), timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            hl: config.hl.clone(),
            gl: config.gl.clone(),
            api_base: MUSIC_API.to_string(),
        })
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    async fn post(&self, endpoint: &str, mut body: Value) -> Result<Value, MetadataError> {
        body["context"] = web_remix::context(&self.hl, &self.gl);

        let url = format!("{}/youtubei/v1/{}?prettyPrint=false", self.api_base, endpoint);
        let res = self
            .http
            .post(&url)
            .header("X-YouTube-Client-Name", web_remix::CLIENT_ID)
            .header("X-YouTube-Client-Version", web_remix::CLIENT_VERSION)
            .header("X-Goog-Api-Format-Version", "2")
            .header("Origin", MUSIC_API)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status));
        }
        Ok(res.json().await?)
    }
}

#[async_trait]
impl MetadataProvider for YouTubeMusicClient {
    async fn search_songs(&self, query: &str) -> Result<Vec<SongSummary>, MetadataError> {
        tracing::debug!("Music search: {}", query);
        let response = self
            .post("search", json!({ "query": query, "params": SONGS_FILTER }))
            .await?;
        Ok(collect_songs(&response))
    }

    async fn trending(&self) -> Result<Chart, MetadataError> {
        let response = self
            .post("browse", json!({ "browseId": CHARTS_BROWSE_ID }))
            .await?;
        Ok(Chart {
            tracks: collect_songs(&response),
        })
    }
}

/// Walks a response tree and returns every song row in document order.
pub fn collect_songs(root: &Value) -> Vec<SongSummary> {
    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

fn walk(node: &Value, out: &mut Vec<SongSummary>) {
    match node {
        Value::Object(map) => {
            if let Some(renderer) = map.get("musicResponsiveListItemRenderer") {
                if let Some(song) = parse_song(renderer) {
                    out.push(song);
                }
                return;
            }
            for value in map.values() {
                walk(value, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, out);
            }
        }
        _ => {}
    }
}

fn flex_runs(renderer: &Value, column: usize) -> Option<&Vec<Value>> {
    renderer
        .get("flexColumns")?
        .get(column)?
        .get("musicResponsiveListItemFlexColumnRenderer")?
        .get("text")?
        .get("runs")?
        .as_array()
}

fn run_text(run: &Value) -> Option<&str> {
    run.get("text").and_then(|t| t.as_str())
}

fn is_artist_run(run: &Value) -> bool {
    run
        .pointer(PAGE_TYPE_PATH)
        .and_then(|v| v.as_str())
        == Some(ARTIST_PAGE_TYPE)
}

fn video_id(renderer: &Value) -> Option<String> {
    let from_title = flex_runs(renderer, 0)
        .and_then(|runs| runs.first())
        .and_then(|run| run.pointer("/navigationEndpoint/watchEndpoint/videoId"));

    renderer
        .pointer("/playlistItemData/videoId")
        .or(from_title)
        .or_else(|| renderer.pointer(OVERLAY_VIDEO_ID_PATH))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Artist names from the subtitle column. Linked artist runs win; otherwise
/// the first ` • ` segment is used, skipping a leading result-type label.
fn artists(renderer: &Value) -> Vec<String> {
    let Some(runs) = flex_runs(renderer, 1) else {
        return Vec::new();
    };

    let linked: Vec<String> = runs
        .iter()
        .filter(|r| is_artist_run(r))
        .filter_map(run_text)
        .map(str::to_string)
        .collect();
    if !linked.is_empty() {
        return linked;
    }

    let mut segments = runs.split(|r| run_text(r).map(str::trim) == Some("•"));
    let mut first = segments.next().unwrap_or_default();
    if matches!(
        first.iter().filter_map(run_text).collect::<String>().as_str(),
        "Song" | "Video"
    ) {
        first = segments.next().unwrap_or_default();
    }

    first
        .iter()
        .filter_map(run_text)
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != "&" && *t != ",")
        .map(str::to_string)
        .collect()
}

fn thumbnail(renderer: &Value) -> Option<String> {
    renderer
        .pointer("/thumbnail/musicThumbnailRenderer/thumbnail/thumbnails")
        .and_then(|v| v.as_array())
        .and_then(|thumbs| thumbs.last())
        .and_then(|t| t.get("url"))
        .and_then(|u| u.as_str())
        .map(str::to_string)
}

/// Rows without a video id are albums, artists or playlists and are skipped.
fn parse_song(renderer: &Value) -> Option<SongSummary> {
    let video_id = video_id(renderer)?;
    let title = flex_runs(renderer, 0)
        .map(|runs| runs.iter().filter_map(run_text).collect::<String>());

    Some(SongSummary {
        title,
        artist: artists(renderer).join(", "),
        video_id: Some(video_id),
        thumbnail: thumbnail(renderer),
    })
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, routing::post};

    use super::*;

    fn artist_run(name: &str) -> Value {
        json!({
            "text": name,
            "navigationEndpoint": { "browseEndpoint": {
                "browseId": format!("UC{}", name),
                "browseEndpointContextSupportedConfigs": {
                    "browseEndpointContextMusicConfig": { "pageType": "MUSIC_PAGE_TYPE_ARTIST" }
                }
            }}
        })
    }

    fn flex_column(runs: Value) -> Value {
        json!({ "musicResponsiveListItemFlexColumnRenderer": { "text": { "runs": runs } } })
    }

    fn song_row(id: &str, title: &str, subtitle: Vec<Value>) -> Value {
        json!({
            "musicResponsiveListItemRenderer": {
                "thumbnail": { "musicThumbnailRenderer": { "thumbnail": { "thumbnails": [
                    { "url": format!("https://img.example/{}/60", id), "width": 60 },
                    { "url": format!("https://img.example/{}/120", id), "width": 120 }
                ]}}},
                "flexColumns": [
                    flex_column(json!([{ "text": title }])),
                    flex_column(json!(subtitle))
                ],
                "playlistItemData": { "videoId": id }
            }
        })
    }

    fn search_response(rows: Vec<Value>) -> Value {
        json!({
            "contents": { "tabbedSearchResultsRenderer": { "tabs": [{ "tabRenderer": {
                "content": { "sectionListRenderer": { "contents": [
                    { "musicShelfRenderer": { "contents": rows } }
                ]}}
            }}]}}
        })
    }

    #[test]
    fn test_parses_song_rows() {
        let response = search_response(vec![
            song_row(
                "vid1",
                "Tum Hi Ho",
                vec![
                    artist_run("Arijit Singh"),
                    json!({ "text": " & " }),
                    artist_run("Mithoon"),
                    json!({ "text": " • " }),
                    json!({ "text": "Aashiqui 2" }),
                ],
            ),
            json!({ "musicResponsiveListItemRenderer": {
                "flexColumns": [flex_column(json!([{ "text": "An album" }]))]
            }}),
        ]);

        let songs = collect_songs(&response);
        assert_eq!(songs.len(), 1);
        assert_eq!(
            songs[0],
            SongSummary {
                title: Some("Tum Hi Ho".into()),
                artist: "Arijit Singh, Mithoon".into(),
                video_id: Some("vid1".into()),
                thumbnail: Some("https://img.example/vid1/120".into()),
            }
        );
    }

    #[test]
    fn test_unlinked_artists_use_first_segment() {
        let row = song_row(
            "vid2",
            "Song Title",
            vec![
                json!({ "text": "Song" }),
                json!({ "text": " • " }),
                json!({ "text": "Some Band" }),
                json!({ "text": " • " }),
                json!({ "text": "3:45" }),
            ],
        );
        let songs = collect_songs(&row);
        assert_eq!(songs[0].artist, "Some Band");
    }

    #[test]
    fn test_video_id_from_overlay() {
        let play = json!({ "playNavigationEndpoint": { "watchEndpoint": { "videoId": "ovr" } } });
        let row = json!({ "musicResponsiveListItemRenderer": {
            "flexColumns": [flex_column(json!([{ "text": "T" }]))],
            "overlay": { "musicItemThumbnailOverlayRenderer": {
                "content": { "musicPlayButtonRenderer": play }
            }}
        }});
        let songs = collect_songs(&row);
        assert_eq!(songs[0].video_id.as_deref(), Some("ovr"));
        assert_eq!(songs[0].artist, "");
        assert_eq!(songs[0].thumbnail, None);
    }

    async fn client_for(app: Router) -> YouTubeMusicClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        YouTubeMusicClient::new(&YouTubeConfig::default(), Duration::from_secs(5))
            .unwrap()
            .with_api_base(format!("http://{}", addr))
    }

    #[tokio::test]
    async fn test_search_metadata_normalizes_query() {
        let app = Router::new().route(
            "/youtubei/v1/search",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["params"], SONGS_FILTER);
                assert_eq!(body["context"]["client"]["clientName"], "WEB_REMIX");
                let query = body["query"].as_str().unwrap_or_default().to_string();
                Json(search_response(vec![
                    song_row("first", &query, vec![artist_run("A")]),
                    song_row("second", "other", vec![artist_run("B")]),
                ]))
            }),
        );
        let client = client_for(app).await;

        let top = client.search_metadata("  Arijit SINGH ").await.unwrap().unwrap();
        assert_eq!(top.title.as_deref(), Some("arijit singh"));
        assert_eq!(top.video_id.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_search_metadata_empty_results() {
        let app = Router::new().route(
            "/youtubei/v1/search",
            post(|| async { Json(search_response(vec![])) }),
        );
        let client = client_for(app).await;

        assert_eq!(client.search_metadata("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_trending_collects_chart_rows() {
        let app = Router::new().route(
            "/youtubei/v1/browse",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["browseId"], CHARTS_BROWSE_ID);
                let rows = vec![
                    song_row("t1", "One", vec![artist_run("X")]),
                    song_row("t2", "Two", vec![artist_run("Y")]),
                ];
                let shelf = json!({ "musicCarouselShelfRenderer": { "contents": rows } });
                let tab = json!({ "tabRenderer": {
                    "content": { "sectionListRenderer": { "contents": [shelf] } }
                }});
                Json(json!({
                    "contents": { "singleColumnBrowseResultsRenderer": { "tabs": [tab] } }
                }))
            }),
        );
        let client = client_for(app).await;

        let chart = client.trending().await.unwrap();
        let ids: Vec<_> = chart.tracks.iter().filter_map(|t| t.video_id.as_deref()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_error_status_propagates() {
        let app = Router::new().route(
            "/youtubei/v1/browse",
            post(|| async { axum::http::StatusCode::SERVICE_UNAVAILABLE }),
        );
        let client = client_for(app).await;

        assert!(matches!(
            client.trending().await,
            Err(MetadataError::Status(s)) if s == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
    }
}
