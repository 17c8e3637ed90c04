use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::server::AppState;

pub const API_VERSION_HEADER: &str = "Rustream-Api-Version";

/// Requires `Authorization: <password>` when `server.password` is set.
pub async fn check_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(password) = state.config.server.password.as_deref() else {
        return Ok(next.run(req).await);
    };

    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(auth) if auth == password => Ok(next.run(req).await),
        Some(_) => {
            warn!("Authorization failed for {}: invalid password", req.uri().path());
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            warn!(
                "Authorization failed for {}: missing Authorization header",
                req.uri().path()
            );
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

pub async fn add_response_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(API_VERSION_HEADER, HeaderValue::from_static("1"));
    response
}
