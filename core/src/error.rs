//! Error types for the todo API client.
//!
//! The server answers failures with a `{"message": ...}` body. `NotFound` and
//! `BadRequest` carry that message; any other non-success status lands in
//! `HttpError` with the raw body.

use std::fmt;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug)]
pub enum ApiError {
    /// 404: the todo does not exist, or it is completed and the operation
    /// is not allowed on it.
    NotFound { message: String },

    /// 400: the request was rejected, e.g. a missing title or a note on a
    /// completed todo.
    BadRequest { message: String },

    /// Any other unexpected status.
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound { message } => write!(f, "not found: {message}"),
            ApiError::BadRequest { message } => write!(f, "bad request: {message}"),
            ApiError::HttpError { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
