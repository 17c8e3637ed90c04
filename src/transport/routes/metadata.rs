use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{common::errors::ErrorBody, server::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    fn text(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.trim().is_empty())
    }
}

/// GET /metadata?q=QUERY, `{}` when nothing matches.
pub async fn get_metadata(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    tracing::info!("GET /metadata: q={:?}", query.q);
    let Some(q) = query.text() else {
        return ErrorBody::bad_request("missing q");
    };

    match state.metadata.search_metadata(q).await {
        Ok(Some(song)) => Json(song).into_response(),
        Ok(None) => Json(json!({})).into_response(),
        Err(e) => {
            tracing::warn!("GET /metadata: {}", e);
            ErrorBody::internal(e.to_string())
        }
    }
}

/// GET /api/search?q=QUERY
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    tracing::info!("GET /api/search: q={:?}", query.q);
    let Some(q) = query.text() else {
        return ErrorBody::bad_request("missing q");
    };

    match state.metadata.search_songs(q).await {
        Ok(results) => Json(json!({ "results": results })).into_response(),
        Err(e) => {
            tracing::warn!("GET /api/search: {}", e);
            ErrorBody::internal(e.to_string())
        }
    }
}

/// GET /trending
pub async fn trending(State(state): State<Arc<AppState>>) -> Response {
    tracing::info!("GET /trending");

    match state.metadata.trending().await {
        Ok(chart) => Json(chart).into_response(),
        Err(e) => {
            tracing::warn!("GET /trending: {}", e);
            ErrorBody::internal(e.to_string())
        }
    }
}
