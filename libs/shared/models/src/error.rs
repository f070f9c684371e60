use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Save rejected by a business rule, e.g. outside clinic hours.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Save rejected because the slot is already taken.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Error class name reported to clients alongside the message.
    pub fn exc_type(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "AuthenticationError",
            AppError::NotFound(_) => "DoesNotExistError",
            AppError::BadRequest(_) => "BadRequestError",
            AppError::Internal(_) => "InternalError",
            AppError::Database(_) => "DatabaseError",
            AppError::ValidationError(_) => "ValidationError",
            AppError::Conflict(_) => "ConflictError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::Auth(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Internal(msg)
            | AppError::Database(msg)
            | AppError::ValidationError(msg)
            | AppError::Conflict(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("Error: {}: {}", status, message);
        } else {
            tracing::warn!("Request rejected: {}: {}", status, message);
        }

        let body = Json(json!({
            "error": message,
            "exc_type": self.exc_type(),
        }));

        (status, body).into_response()
    }
}
