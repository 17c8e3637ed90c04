use std::{net::SocketAddr, sync::Arc};

use rustream::{
    cache::StreamCache,
    common::{
        banner::{BannerInfo, print_banner},
        logger,
        types::AnyResult,
    },
    configs::Config,
    log_println,
    proxy::{ProxyPool, ProxySourceFetcher, ProxyStore, RefreshScheduler},
    resolver::StreamResolver,
    server::AppState,
    sources::youtube::{YouTubeExtractor, YouTubeMusicClient},
    transport,
};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;
    logger::init(config.logging.as_ref());
    print_banner(&BannerInfo::default());

    let cancel = CancellationToken::new();

    let pool = if config.proxies.enabled {
        let store = ProxyStore::new(&config.proxies.cache_file);
        log_println!("Proxy snapshot file: {}", store.path().display());
        Arc::new(ProxyPool::restore(store))
    } else {
        log_println!("Proxy pool disabled, every request goes direct");
        Arc::new(ProxyPool::new())
    };

    let refresh = if config.proxies.enabled {
        let fetcher = Arc::new(ProxySourceFetcher::new(&config.proxies)?);
        let handle = RefreshScheduler::new(pool.clone(), fetcher, config.proxies.refresh_interval())
            .refresh_on_start(config.proxies.refresh_on_start)
            .spawn(cancel.clone());
        Some(handle)
    } else {
        None
    };

    let cache = Arc::new(StreamCache::from_config(&config.cache));
    let extractor = Arc::new(YouTubeExtractor::new(
        &config.youtube,
        config.resolver.attempt_timeout(),
    )?);
    let resolver = Arc::new(StreamResolver::new(
        pool.clone(),
        cache,
        extractor,
        &config.resolver,
    ));
    let metadata = Arc::new(YouTubeMusicClient::new(
        &config.youtube,
        config.resolver.attempt_timeout(),
    )?);

    let address: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = Arc::new(AppState {
        config,
        pool,
        resolver,
        metadata,
        refresh: refresh.as_ref().map(|h| h.trigger()),
    });

    let app = transport::http_server::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Rustream listening on {}", address);

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = shutdown_signal() => shutdown.cancel(),
                _ = shutdown.cancelled() => {}
            }
        })
        .await?;

    cancel.cancel();
    if let Some(handle) = refresh {
        handle.join().await;
    }
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
