use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{common::errors::ErrorBody, server::AppState};

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub video_id: Option<String>,
}

/// GET /stream?video_id=ID
pub async fn stream_url(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
) -> Response {
    tracing::info!("GET /stream: video_id={:?}", query.video_id);

    let Some(video_id) = query
        .video_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
    else {
        return ErrorBody::bad_request("missing video_id");
    };

    match state.resolver.resolve(video_id).await {
        Ok(url) => Json(json!({ "url": url })).into_response(),
        Err(e) => ErrorBody::internal(e.to_string()),
    }
}

/// GET /stream/{video_id}, redirects to the resolved URL.
pub async fn stream_redirect(
    Path(video_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    tracing::info!("GET /stream/{}", video_id);

    match state.resolver.resolve(&video_id).await {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(e) => ErrorBody::internal(e.to_string()),
    }
}
