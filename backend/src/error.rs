use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use opening_trainer::TrainerError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TrainerError> for ApiError {
    fn from(err: TrainerError) -> Self {
        match err {
            TrainerError::UnknownOpening { .. } | TrainerError::UnknownUser { .. } => {
                ApiError::NotFound(err.to_string())
            }
            TrainerError::MalformedOpening { .. } | TrainerError::IllegalMove { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            TrainerError::FallbackUnavailable { .. } | TrainerError::Io(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("[API] {}", self);
        } else {
            tracing::debug!("[API] {} {}", status, self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
