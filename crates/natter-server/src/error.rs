//! The server-side error type and its HTTP mapping.
//!
//! Every failure a handler can produce converges here, and this is the only
//! place where error kinds turn into status codes.  Bodies are always
//! `{"error": {"kind", "message", "detail?"}}`; `detail` carries the
//! underlying diagnostic verbatim for store and upstream failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use natter_pipeline::PipelineError;
use natter_store::StoreError;

use crate::weather::WeatherError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error")]
    Store(#[source] StoreError),

    #[error("Weather service request failed")]
    Upstream(#[source] WeatherError),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_input",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Store(_) => "store_error",
            ApiError::Upstream(_) => "upstream_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, None),
            ApiError::Store(source) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Some(source.to_string()))
            }
            ApiError::Upstream(source) => (StatusCode::BAD_GATEWAY, Some(source.to_string())),
        };

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), detail = detail.as_deref(), "Request failed");
        }

        let mut error = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some(detail) = detail {
            error["detail"] = serde_json::Value::String(detail);
        }

        (status, axum::Json(serde_json::json!({ "error": error }))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidInput(msg) => ApiError::BadRequest(msg),
            PipelineError::NotFound(msg) => ApiError::NotFound(msg),
            PipelineError::Conflict(msg) => ApiError::Conflict(msg),
            PipelineError::Store(source) => ApiError::Store(source),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        ApiError::Upstream(err)
    }
}
