//! Domain error types for the report pipeline.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
///
/// Only `MissingInput` and `Storage` abort report generation; every other
/// variant is isolated to the smallest affected unit (one file, one
/// attachment, one record) and logged where it occurs.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Current-run input file absent or unparsable. Fatal.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// A single history file failed to parse. Skipped with a warning.
    #[error("Malformed history record: {0}")]
    MalformedHistory(String),

    /// An attachment file could not be read. Dropped from the output.
    #[error("Missing attachment: {0}")]
    MissingAttachment(String),

    /// A record is missing required `run`/`results` content.
    #[error("Inconsistent record: {0}")]
    Inconsistent(String),

    /// Resource not found (serve mode)
    #[error("{0} not found")]
    NotFound(String),

    /// Writing report or history output failed. Fatal.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Whether this error aborts the whole pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::MissingInput(_) | AppError::Storage(_))
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code, response_message) = match self {
            AppError::MissingInput(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "MISSING_INPUT",
                self.to_string(),
            ),
            AppError::MalformedHistory(_) => (
                actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
                "MALFORMED_HISTORY",
                self.to_string(),
            ),
            AppError::MissingAttachment(_) => (
                actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
                "MISSING_ATTACHMENT",
                self.to_string(),
            ),
            AppError::Inconsistent(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INCONSISTENT_RECORD",
                self.to_string(),
            ),
            AppError::NotFound(_) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
            ),
            AppError::Storage(err_str) => {
                tracing::error!("Storage error: {}", err_str);
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "An internal storage error occurred".to_string(),
                )
            }
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MissingInput(format!("JSON parsing error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
