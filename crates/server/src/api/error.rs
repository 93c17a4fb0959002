use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use prediction::PredictError;
use serde_json::json;
use storage::StorageError;
use thiserror::Error;
use tracing::error;

/// Error returned by every route; rendered as `{"detail": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("bad_request: {0}")]
    BadRequest(String),

    #[error("not_found: {0}")]
    NotFound(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("internal_error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::Unavailable(msg)
            | Self::Internal(msg) => msg,
        };
        if status.is_server_error() {
            error!(%status, %detail, "Request failed");
        }

        (status, axum::Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        match e {
            PredictError::ServiceUnavailable(_) => Self::Unavailable(e.to_string()),
            PredictError::NotFound(_) => Self::NotFound(e.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(_) => Self::NotFound(e.to_string()),
            StorageError::EmptyBatch => Self::BadRequest(e.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<common::Error> for ApiError {
    fn from(e: common::Error) -> Self {
        Self::BadRequest(e.to_string())
    }
}
