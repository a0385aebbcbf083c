use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;

/// Errors surfaced by handlers. Details of 5xx variants go to the log only.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(m) => AppError::StoreUnavailable(m),
            StoreError::Query(m) | StoreError::Decode(m) => AppError::Internal(m),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::NotFound(m) => json!({ "message": m }),
            AppError::Validation(m) => json!({ "error": m }),
            AppError::StoreUnavailable(_) => json!({ "error": "Store unavailable" }),
            AppError::Internal(_) => json!({ "error": "Something went wrong" }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
