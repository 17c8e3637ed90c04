use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{common::errors::ErrorBody, server::AppState};

/// GET /proxies
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::info!("GET /proxies");
    let proxies = state.pool.snapshot();
    Json(json!({
        "enabled": state.config.proxies.enabled,
        "working": proxies.len(),
        "known": state.pool.known_len(),
        "proxies": proxies,
    }))
}

/// POST /proxies/refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> Response {
    tracing::info!("POST /proxies/refresh");
    match &state.refresh {
        Some(trigger) => {
            trigger.fire();
            StatusCode::ACCEPTED.into_response()
        }
        None => ErrorBody::unavailable("proxy pool is disabled"),
    }
}
