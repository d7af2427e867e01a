use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use todo_core::IdentityError;

use crate::store::StoreError;

/// Every failure a handler can answer with. Each variant maps to one status
/// and a `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Todo not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    /// The identity provider refused the request (bad code, bad token).
    #[error("identity provider rejected the request: {0}")]
    UpstreamRejected(String),

    /// The identity provider could not be reached or answered nonsense.
    #[error("identity provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("storage fault: {0}")]
    Storage(#[source] sqlx::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::UpstreamRejected(_) => StatusCode::UNAUTHORIZED,
            AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound,
            StoreError::Validation(err) => AppError::Validation(err.to_string()),
            StoreError::Database(err) => AppError::Storage(err),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidState => AppError::Validation(err.to_string()),
            err if err.is_client_rejection() => AppError::UpstreamRejected(err.to_string()),
            err => AppError::UpstreamUnavailable(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Storage(err) => {
                tracing::error!(error = %err, "storage fault");
                "internal server error".to_string()
            }
            AppError::UpstreamUnavailable(_) | AppError::UpstreamRejected(_) => {
                tracing::warn!(error = %self, "identity provider call failed");
                self.to_string()
            }
            _ => self.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
