//! Error types for the Slate server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::pdf::ExtractError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// No primary file is attached to the book
    #[error("No primary file for book {0}")]
    FileNotFound(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::FileNotFound(book_id) => (
                StatusCode::NOT_FOUND,
                "file_not_found",
                format!("No file found for book {}", book_id),
            ),
            AppError::Extraction(e) => match e {
                ExtractError::PageOutOfRange { page, page_count } => (
                    StatusCode::BAD_REQUEST,
                    "page_out_of_range",
                    format!("Page {} exceeds total pages ({})", page, page_count),
                ),
                ExtractError::Timeout(secs) => {
                    tracing::error!("Extraction timed out after {}s", secs);
                    (
                        StatusCode::GATEWAY_TIMEOUT,
                        "extraction_timeout",
                        "Timed out extracting PDF content".to_string(),
                    )
                }
                ExtractError::Stalled(path) => {
                    tracing::warn!("Extraction of {} still running, refusing request", path);
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "extraction_busy",
                        "PDF is still being processed, try again later".to_string(),
                    )
                }
                _ => {
                    tracing::error!("Extraction error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "extraction_error",
                        "Failed to extract PDF content".to_string(),
                    )
                }
            },
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error".to_string(),
                )
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    "IO error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.status_and_message();

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_path_errors_are_distinguishable() {
        let out_of_range = AppError::from(ExtractError::PageOutOfRange {
            page: 12,
            page_count: 10,
        });
        let missing_file = AppError::FileNotFound("book-1".to_string());
        let broken = AppError::from(ExtractError::MuPdf("corrupt xref".to_string()));
        let invalid = AppError::BadRequest("Invalid page number".to_string());

        let (status, kind, _) = out_of_range.status_and_message();
        assert_eq!((status, kind), (StatusCode::BAD_REQUEST, "page_out_of_range"));

        let (status, kind, _) = missing_file.status_and_message();
        assert_eq!((status, kind), (StatusCode::NOT_FOUND, "file_not_found"));

        let (status, kind, _) = broken.status_and_message();
        assert_eq!(
            (status, kind),
            (StatusCode::INTERNAL_SERVER_ERROR, "extraction_error")
        );

        let (status, kind, _) = invalid.status_and_message();
        assert_eq!((status, kind), (StatusCode::BAD_REQUEST, "bad_request"));
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let err = AppError::from(ExtractError::Timeout(15));
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_stalled_file_maps_to_unavailable() {
        let err = AppError::from(ExtractError::Stalled("/library/slow.pdf".to_string()));
        let (status, kind, _) = err.status_and_message();
        assert_eq!((status, kind), (StatusCode::SERVICE_UNAVAILABLE, "extraction_busy"));
    }
}
