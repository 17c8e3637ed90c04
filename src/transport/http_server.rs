use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    server::AppState,
    transport::{
        middleware::{add_response_headers, check_auth},
        routes::{info, metadata, proxies, stream},
    },
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/stream", get(stream::stream_url))
        .route("/stream/{video_id}", get(stream::stream_redirect))
        .route("/metadata", get(metadata::get_metadata))
        .route("/api/search", get(metadata::search))
        .route("/trending", get(metadata::trending))
        .route("/proxies", get(proxies::status))
        .route("/proxies/refresh", post(proxies::refresh))
        .route("/version", get(info::get_version))
        .layer(middleware::from_fn_with_state(state.clone(), check_auth))
        .layer(middleware::from_fn(add_response_headers))
        .with_state(state)
}
