use std::{collections::HashSet, sync::LazyLock, time::Duration};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::{
    common::{http::HttpClient, types::ProxyEndpoint},
    configs::{ProxiesConfig, ProxySourceConfig},
};

static ROW_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("table tbody tr").ok());

/// Column layout of the free-proxy-list table: IP, Port, Code, Country,
/// Anonymity, Google, Https, Last Checked.
const HTML_MIN_CELLS: usize = 7;
const HTML_HTTPS_CELL: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum ProxySourceError {
    #[error("proxy listing {url} unavailable: {source}")]
    Unavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Produces validated relay candidates. Never fails: an unreachable listing
/// contributes nothing.
#[async_trait]
pub trait ProxyFetcher: Send + Sync {
    async fn fetch_candidates(&self) -> Vec<ProxyEndpoint>;
}

/// Text of the `<td>` cells directly under `row`. Cells of nested tables
/// belong to their own rows.
fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| cell.value().name() == "td")
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

/// Extracts HTTPS-capable rows from every `table tbody tr` of a proxy table.
pub fn parse_html_table(html: &str) -> Vec<ProxyEndpoint> {
    let Some(rows) = ROW_SELECTOR.as_ref() else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let mut proxies = Vec::new();

    for row in document.select(rows) {
        let cells = row_cells(row);
        if cells.len() < HTML_MIN_CELLS {
            continue;
        }
        if !cells[HTML_HTTPS_CELL].eq_ignore_ascii_case("yes") {
            continue;
        }
        let (ip, port) = (&cells[0], &cells[1]);
        if ip.is_empty() || port.parse::<u16>().is_err() {
            continue;
        }

        proxies.push(ProxyEndpoint::from_parts("http", ip, port));
    }

    proxies
}

/// One `host:port` per line; lines that already carry a scheme are kept.
pub fn parse_plain_text(text: &str, scheme: &str) -> Vec<ProxyEndpoint> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            if line.contains("://") {
                ProxyEndpoint::from(line)
            } else {
                ProxyEndpoint::from(format!("{}://{}", scheme, line))
            }
        })
        .collect()
}

/// Order-preserving deduplication.
pub fn dedup(candidates: Vec<ProxyEndpoint>) -> Vec<ProxyEndpoint> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

pub struct ProxySourceFetcher {
    http: reqwest::Client,
    sources: Vec<ProxySourceConfig>,
    validation_url: String,
    validation_timeout: Duration,
    validation_concurrency: usize,
    max_candidates: usize,
}

impl ProxySourceFetcher {
    pub fn new(config: &ProxiesConfig) -> reqwest::Result<Self> {
        Ok(Self {
            http: HttpClient::new(config.fetch_timeout())?,
            sources: config.sources.clone(),
            validation_url: config.validation_url.clone(),
            validation_timeout: config.validation_timeout(),
            validation_concurrency: config.validation_concurrency.max(1),
            max_candidates: config.max_candidates,
        })
    }

    async fn fetch_listing(
        &self,
        source: &ProxySourceConfig,
    ) -> Result<Vec<ProxyEndpoint>, ProxySourceError> {
        let url = source.url();
        let unavailable = |source| ProxySourceError::Unavailable {
            url: url.to_string(),
            source,
        };

        let body = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(unavailable)?
            .text()
            .await
            .map_err(unavailable)?;

        Ok(match source {
            ProxySourceConfig::HtmlTable { .. } => parse_html_table(&body),
            ProxySourceConfig::PlainText { scheme, .. } => parse_plain_text(&body, scheme),
        })
    }

    /// Raw candidates from every listing, merged, deduplicated and capped.
    pub async fn collect_candidates(&self) -> Vec<ProxyEndpoint> {
        let mut merged = Vec::new();
        for source in &self.sources {
            match self.fetch_listing(source).await {
                Ok(found) => {
                    if found.is_empty() {
                        warn!("Proxy listing {} contained no usable entries", source.url());
                    } else {
                        debug!("Proxy listing {} returned {} entries", source.url(), found.len());
                    }
                    merged.extend(found);
                }
                Err(e) => warn!("{}", e),
            }
        }

        let mut candidates = dedup(merged);
        if candidates.len() > self.max_candidates {
            debug!(
                "Capping {} proxy candidates to {}",
                candidates.len(),
                self.max_candidates
            );
            candidates.truncate(self.max_candidates);
        }
        candidates
    }

    /// Requests the echo endpoint through `candidate`.
    pub async fn check_liveness(&self, candidate: &ProxyEndpoint) -> bool {
        let client = match HttpClient::via_proxy(candidate, self.validation_timeout) {
            Ok(c) => c,
            Err(e) => {
                debug!("Rejecting proxy {}: invalid endpoint: {}", candidate, e);
                return false;
            }
        };

        match client.get(&self.validation_url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                debug!("Rejecting proxy {}: echo returned {}", candidate, resp.status());
                false
            }
            Err(e) => {
                debug!("Rejecting proxy {}: {}", candidate, e);
                false
            }
        }
    }
}

#[async_trait]
impl ProxyFetcher for ProxySourceFetcher {
    async fn fetch_candidates(&self) -> Vec<ProxyEndpoint> {
        let candidates = self.collect_candidates().await;
        if candidates.is_empty() {
            return candidates;
        }

        let total = candidates.len();
        let admitted: Vec<ProxyEndpoint> = stream::iter(candidates)
            .map(|candidate| async move {
                let alive = self.check_liveness(&candidate).await;
                alive.then_some(candidate)
            })
            .buffer_unordered(self.validation_concurrency)
            .filter_map(|p| async move { p })
            .collect()
            .await;

        info!("Validated proxies: {}/{} working", admitted.len(), total);
        dedup(admitted)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{Router, routing::get};

    use super::*;

    const TABLE: &str = r#"
        <table class="table table-striped table-bordered">
            <thead><tr><th>IP Address</th><th>Port</th><th>Code</th><th>Country</th>
                <th>Anonymity</th><th>Google</th><th>Https</th><th>Last Checked</th></tr></thead>
            <tbody>
                <tr><td>203.0.113.7</td><td>8080</td><td>US</td><td class='hm'>United States</td>
                    <td>elite proxy</td><td class='hm'>no</td><td class='hx'>yes</td>
                    <td>1 min ago</td></tr>
                <tr><td>203.0.113.8</td><td>3128</td><td>DE</td><td class='hm'>Germany</td>
                    <td>anonymous</td><td class='hm'>no</td><td class='hx'>no</td>
                    <td>2 mins ago</td></tr>
                <tr><td><b>198.51.100.2</b></td><td>80</td><td>FR</td><td>France</td>
                    <td>anonymous</td><td>yes</td><td>YES</td><td>5 mins ago</td></tr>
                <tr><td>198.51.100.3</td><td>not-a-port</td><td>FR</td><td>France</td>
                    <td>anonymous</td><td>yes</td><td>yes</td><td>5 mins ago</td></tr>
                <tr><td>short</td><td>row</td></tr>
            </tbody>
        </table>"#;

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn fetcher_for(sources: Vec<ProxySourceConfig>) -> ProxySourceFetcher {
        let config = ProxiesConfig {
            sources,
            validation_url: "http://echo.invalid/ip".to_string(),
            validation_timeout_secs: 2,
            fetch_timeout_secs: 2,
            ..ProxiesConfig::default()
        };
        ProxySourceFetcher::new(&config).unwrap()
    }

    #[test]
    fn test_html_table_keeps_https_rows_only() {
        let proxies = parse_html_table(TABLE);
        assert_eq!(
            proxies,
            vec![
                ProxyEndpoint::from("http://203.0.113.7:8080"),
                ProxyEndpoint::from("http://198.51.100.2:80"),
            ]
        );
    }

    #[test]
    fn test_html_table_tolerates_markup_quirks() {
        let html = r#"
            <table><tbody>
                <tr><td title="a>b">192.0.2.10</td><td>8000</td><td/><td>NL</td>
                    <td>elite proxy</td><td>no</td><td>yes</td></tr>
                <tr><td>192.0.2.11</td><td>8001</td><td>NL</td><td>Netherlands</td>
                    <td>anonymous</td><td>no</td>
                    <td><table><tbody><tr><td>yes</td></tr></tbody></table>no</td></tr>
            </tbody></table>"#;
        assert_eq!(
            parse_html_table(html),
            vec![ProxyEndpoint::from("http://192.0.2.10:8000")]
        );
    }

    #[test]
    fn test_html_without_tbody_yields_nothing() {
        assert!(parse_html_table("<html><body>blocked</body></html>").is_empty());
    }

    #[test]
    fn test_plain_text_lines() {
        let text = "1.2.3.4:80\n\n  5.6.7.8:3128  \r\n# comment\nsocks5://9.9.9.9:1080\n";
        assert_eq!(
            parse_plain_text(text, "http"),
            vec![
                ProxyEndpoint::from("http://1.2.3.4:80"),
                ProxyEndpoint::from("http://5.6.7.8:3128"),
                ProxyEndpoint::from("socks5://9.9.9.9:1080"),
            ]
        );
    }

    #[test]
    fn test_dedup_preserves_first_occurrence() {
        let list = vec![
            ProxyEndpoint::from("http://b:2"),
            ProxyEndpoint::from("http://a:1"),
            ProxyEndpoint::from("http://b:2"),
        ];
        assert_eq!(
            dedup(list),
            vec![ProxyEndpoint::from("http://b:2"), ProxyEndpoint::from("http://a:1")]
        );
    }

    #[tokio::test]
    async fn test_fetch_candidates_admits_only_live_relays() {
        // Any request reaching this server, including absolute-form proxied
        // requests, gets a 200.
        let relay = serve(Router::new().fallback(|| async { r#"{"origin":"203.0.113.7"}"# })).await;
        let port = relay.port();
        let listing = format!("127.0.0.1:{}\n127.0.0.1:1\n127.0.0.1:{}\n", port, port);
        let lists =
            serve(Router::new().route("/http.txt", get(move || async move { listing }))).await;

        let fetcher = fetcher_for(vec![ProxySourceConfig::PlainText {
            url: format!("http://{}/http.txt", lists),
            scheme: "http".into(),
        }]);

        let admitted = fetcher.fetch_candidates().await;
        assert_eq!(
            admitted,
            vec![ProxyEndpoint::from(format!("http://127.0.0.1:{}", relay.port()))]
        );
    }

    #[tokio::test]
    async fn test_relay_with_error_status_is_rejected() {
        let relay = serve(Router::new().fallback(|| async {
            (axum::http::StatusCode::FORBIDDEN, "denied")
        }))
        .await;
        let fetcher = fetcher_for(Vec::new());
        let candidate = ProxyEndpoint::from(format!("http://{}", relay));
        assert!(!fetcher.check_liveness(&candidate).await);
    }

    #[tokio::test]
    async fn test_unreachable_listing_yields_empty() {
        let fetcher = fetcher_for(vec![ProxySourceConfig::HtmlTable {
            url: "http://127.0.0.1:1/".into(),
        }]);
        assert!(fetcher.fetch_candidates().await.is_empty());
    }

    #[tokio::test]
    async fn test_listings_are_merged_deduplicated_and_capped() {
        let plain = "203.0.113.7:8080\n192.0.2.1:80\n192.0.2.2:80\n";
        let lists = serve(
            Router::new()
                .route("/table", get(|| async { TABLE }))
                .route("/a.txt", get(move || async move { plain })),
        )
        .await;

        let mut fetcher = fetcher_for(vec![
            ProxySourceConfig::HtmlTable {
                url: format!("http://{}/table", lists),
            },
            ProxySourceConfig::PlainText {
                url: format!("http://{}/a.txt", lists),
                scheme: "http".into(),
            },
        ]);

        let all = fetcher.collect_candidates().await;
        assert_eq!(
            all,
            vec![
                ProxyEndpoint::from("http://203.0.113.7:8080"),
                ProxyEndpoint::from("http://198.51.100.2:80"),
                ProxyEndpoint::from("http://192.0.2.1:80"),
                ProxyEndpoint::from("http://192.0.2.2:80"),
            ]
        );

        fetcher.max_candidates = 3;
        assert_eq!(fetcher.collect_candidates().await.len(), 3);
    }
}
