use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON error body returned by every route: `{ "error": "..." }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }

    pub fn bad_request(message: impl Into<String>) -> Response {
        Self::new(message).with_status(StatusCode::BAD_REQUEST)
    }

    pub fn internal(message: impl Into<String>) -> Response {
        Self::new(message).with_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn unavailable(message: impl Into<String>) -> Response {
        Self::new(message).with_status(StatusCode::SERVICE_UNAVAILABLE)
    }
}
