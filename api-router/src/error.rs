use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::AppError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Indexing failed")]
    IndexingFailed(String),

    #[error("Generation failed")]
    GenerationFailed(String),
}

impl ApiError {
    /// The corpus write did not complete; generation was never attempted.
    pub fn indexing(err: AppError) -> Self {
        tracing::error!("Indexing dependency failure: {:?}", err);
        Self::IndexingFailed(err.to_string())
    }

    /// The pipeline failed after the corpus write committed.
    pub fn generation(err: AppError) -> Self {
        tracing::error!("Generation dependency failure: {:?}", err);
        Self::GenerationFailed(err.to_string())
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => Self::ValidationError(msg),
            other => {
                tracing::error!("Internal error: {:?}", other);
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    status: "error".to_string(),
                },
            ),
            Self::ValidationError(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    status: "error".to_string(),
                },
            ),
            Self::IndexingFailed(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse {
                    error: "The question could not be indexed".to_string(),
                    status: "error".to_string(),
                },
            ),
            Self::GenerationFailed(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse {
                    error: "The answer could not be generated".to_string(),
                    status: "error".to_string(),
                },
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: String,
    status: String,
}
