//! Error types for the library catalog

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes carried in every error response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchBook = 5,
    BookNotAvailable = 7,
    Duplicate = 8,
    AlreadyBorrowed = 11,
    NotBorrowed = 12,
    BookBorrowed = 13,
    BadValue = 18,
    UserAlreadyExists = 19,
    Conflict = 22,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Authorization(String),

    #[error("No Book With Id {0}")]
    BookNotFound(String),

    #[error("No User With Username {0}")]
    UserNotFound(String),

    #[error("{}", .0.join(","))]
    Validation(Vec<String>),

    #[error("You can't borrow {0} because you already have the book")]
    AlreadyHave(String),

    #[error("You can't release {0} because you don't have the book")]
    NotBorrowed(String),

    #[error("You can't borrow {0} as the amount is zero")]
    AmountIsZero(String),

    #[error("book with id {0} exists")]
    DuplicateId(String),

    #[error("cannot delete {0} because it is still borrowed")]
    StillBorrowed(String),

    #[error("book {0} was modified by another request, try again")]
    ConcurrentModification(String),

    #[error("{0} already exists")]
    UsernameTaken(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Every violated rule, for validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl AppError {
    /// Status and code the transport reports for this failure
    pub fn classify(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized),
            AppError::BookNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchBook),
            AppError::UserNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchUser),
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::AlreadyHave(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::AlreadyBorrowed)
            }
            AppError::NotBorrowed(_) => (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::NotBorrowed),
            AppError::AmountIsZero(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::BookNotAvailable)
            }
            AppError::DuplicateId(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::StillBorrowed(_) => (StatusCode::CONFLICT, ErrorCode::BookBorrowed),
            AppError::ConcurrentModification(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
            AppError::UsernameTaken(_) => (StatusCode::CONFLICT, ErrorCode::UserAlreadyExists),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let details = match self {
            AppError::Validation(messages) => messages,
            _ => Vec::new(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
