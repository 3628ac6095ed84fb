use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error};

use crate::models::MessageResponse;
use crate::storage::StorageError;

pub const TODO_NOT_FOUND: &str = "Todo not found";
pub const TODO_NOT_FOUND_OR_COMPLETED: &str = "Todo not found or already completed";
pub const TODO_COMPLETED: &str = "Todo is already completed";

/// Error returned by every handler. Rendered as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The operation is not allowed on a completed todo.
    #[error("{0}")]
    Conflict(String),

    #[error("Database error")]
    Storage(#[source] StorageError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps the outcome of a write guarded by `completed = false`, where the
    /// store cannot tell a missing row from a completed one.
    pub fn guarded(err: StorageError) -> Self {
        match err {
            StorageError::NotFound | StorageError::Completed => {
                AppError::NotFound(TODO_NOT_FOUND_OR_COMPLETED.to_string())
            }
            other => AppError::Storage(other),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => AppError::NotFound(TODO_NOT_FOUND.to_string()),
            StorageError::Completed => AppError::Conflict(TODO_COMPLETED.to_string()),
            other => AppError::Storage(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// An id that is not an integer can never match a row.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        debug!(error = %rejection.body_text(), "rejected path parameter");
        AppError::NotFound(TODO_NOT_FOUND.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Storage(err) = &self {
            error!(error = %err, "storage error");
        }
        (status, Json(MessageResponse::new(self.to_string()))).into_response()
    }
}
