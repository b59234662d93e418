//! Error types for Bookshelf server

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// SQLSTATE raised by Postgres on a unique constraint violation
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE raised when a value does not fit its column
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

/// Stable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchBook = 5,
    BadCredentials = 6,
    BadValue = 7,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Login attempted with a username nobody registered
    #[error("Unknown login: {0}")]
    UnknownLogin(String),

    /// A user reference in a book update did not resolve
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Hashing error: {0}")]
    Hashing(String),
}

impl AppError {
    /// Turn unique violations and oversized values into validation errors, keep everything else as is.
    pub fn from_db(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if let Some(UNIQUE_VIOLATION | STRING_DATA_RIGHT_TRUNCATION) = db_err.code().as_deref() {
                return AppError::Validation(db_err.message().to_string());
            }
        }
        AppError::Database(err)
    }

    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized),
            AppError::InvalidCredentials(_) => (StatusCode::UNAUTHORIZED, ErrorCode::BadCredentials),
            AppError::UnknownLogin(_) => (StatusCode::BAD_REQUEST, ErrorCode::NoSuchUser),
            AppError::UserNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchUser),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchBook),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Hashing(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Validation(msg)
            | AppError::Authorization(msg)
            | AppError::InvalidCredentials(msg)
            | AppError::UnknownLogin(msg)
            | AppError::UserNotFound(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                e.to_string()
            }
            AppError::Hashing(msg) => {
                tracing::error!("Hashing error: {}", msg);
                msg.clone()
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
