//! Error taxonomy for the idea board API
//!
//! Every handler returns `Result<_, AppError>`; the `IntoResponse` impl maps
//! each variant to a status code and a JSON body of the form
//! `{"error": "...", "code": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Field constraints violated (client error)
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced record missing (client error)
    #[error("{0} not found")]
    NotFound(String),

    /// IP already bound to a different idea (client error, not retried)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Backing store failure; the request is aborted and the enclosing
    /// transaction rolls back, so no partial writes are visible
    #[error("storage error: {0}")]
    Storage(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::Storage(_) => "storage_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Storage(detail) = &self {
            tracing::error!(%detail, "storage failure");
        }
        (
            self.status(),
            Json(json!({
                "error": self.to_string(),
                "code": self.code(),
            })),
        )
            .into_response()
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(e: redb::TransactionError) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<redb::TableError> for AppError {
    fn from(e: redb::TableError) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<redb::StorageError> for AppError {
    fn from(e: redb::StorageError) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(e: redb::CommitError) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}
