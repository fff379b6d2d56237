//! Error types for Libris server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable application error codes returned to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    DbFailure = 2,
    NoSuchUser = 3,
    NoSuchBook = 4,
    BookNotAvailable = 5,
    BookNotBorrowed = 6,
    Duplicate = 7,
    BadValue = 8,
    UserHasBorrowedBooks = 9,
    BookIsBorrowed = 10,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Account lookup or login failure; carries the NoSuchUser code
    #[error("Not found: {0}")]
    UserNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// Borrow rejected: some requested books are unknown or already out
    #[error("{} book(s) not available", book_ids.len())]
    Unavailable { book_ids: Vec<i32> },

    /// Return rejected: some requested books are not held by this user
    #[error("{} book(s) not borrowed by this user", book_ids.len())]
    NotBorrowed { book_ids: Vec<i32> },
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Identifiers the request was rejected over (bulk mismatch reports)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_ids: Option<Vec<i32>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, book_ids) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchBook, msg.clone(), None)
            }
            AppError::UserNotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchUser, msg.clone(), None)
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone(), None)
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone(), None)
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone(), None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Unavailable { book_ids } => (
                StatusCode::BAD_REQUEST,
                ErrorCode::BookNotAvailable,
                "Some books are not available for borrowing".to_string(),
                Some(book_ids.clone()),
            ),
            AppError::NotBorrowed { book_ids } => (
                StatusCode::BAD_REQUEST,
                ErrorCode::BookNotBorrowed,
                "Some books are not borrowed by this user".to_string(),
                Some(book_ids.clone()),
            ),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            book_ids,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut parts: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("invalid value for {}", field),
                })
            })
            .collect();
        parts.sort();
        AppError::Validation(parts.join("; "))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
