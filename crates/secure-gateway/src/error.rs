use axum::http::StatusCode;
use axum::Json;

use crate::backend::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Carries the block reason only, never the prompt.
    #[error("{0}")]
    Blocked(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Blocked(_) => StatusCode::FORBIDDEN,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Client-facing text for backend failures.  Details (URLs, status codes)
/// stay in the server log.
pub const BACKEND_UNAVAILABLE: &str = "LLM backend unavailable";

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = match &self {
            Self::Blocked(reason) => serde_json::json!({ "detail": reason }),
            Self::Backend(_) => serde_json::json!({ "error": BACKEND_UNAVAILABLE }),
        };
        (status, Json(body)).into_response()
    }
}
