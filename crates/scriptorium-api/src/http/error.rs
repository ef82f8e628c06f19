//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use scriptorium_types::error::{EssayError, RepositoryError, ResearchError, SessionError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Essay(EssayError),
    Research(ResearchError),
    Session(SessionError),
    Repository(RepositoryError),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<EssayError> for AppError {
    fn from(e: EssayError) -> Self {
        AppError::Essay(e)
    }
}

impl From<ResearchError> for AppError {
    fn from(e: ResearchError) -> Self {
        AppError::Research(e)
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl AppError {
    /// Status, machine-readable code, and message for this error.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Essay(EssayError::Llm(e)) | AppError::Research(ResearchError::Llm(e)) => {
                (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", e.to_string())
            }
            AppError::Essay(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Research(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Session(SessionError::NotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
            ),
            AppError::Repository(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }

    /// Whether the user can fix this by changing their input.
    pub fn is_validation(&self) -> bool {
        self.parts().0 == StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        }
        ApiResponse::error(code, &message, Uuid::now_v7().to_string(), 0).into_response()
    }
}
