//! Error handling for the bookstore HTTP layer

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::{Timestamp, Uuid};

/// Body of every 401 answered by the access gate.
pub const UNAUTHORIZED_MESSAGE: &str =
    "The request didn't include an API key, or the key was invalid";

/// Body of every 404 caused by a storage fault.
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("unauthorized: missing or invalid API key")]
    Unauthorized,

    #[error("not found: {message}")]
    NotFound { message: String },

    /// A create that collided with an existing record. Answered with 404 and
    /// `status: 1` for compatibility with existing clients.
    #[error("already exists: {message}")]
    AlreadyExists { message: String },

    #[error("method {0} not supported")]
    MethodNotSupported(Method),

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("request timed out")]
    Timeout,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create an unauthorized error
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    /// Create a not found error with the generic message
    pub fn resource_not_found() -> Self {
        Self::not_found(NOT_FOUND_MESSAGE)
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an already-exists error
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
        }
    }

    /// Create a method-not-supported error
    pub fn method_not_supported(method: Method) -> Self {
        Self::MethodNotSupported(method)
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } | AppError::AlreadyExists { .. } => StatusCode::NOT_FOUND,
            AppError::MethodNotSupported(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v7(Timestamp::now(uuid::NoContext));
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %self,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %self,
                "Request rejected"
            );
        }

        let body = match self {
            AppError::Unauthorized => json!({ "message": UNAUTHORIZED_MESSAGE }),
            AppError::NotFound { message }
            | AppError::Validation { message }
            | AppError::BadRequest { message } => json!({ "message": message }),
            AppError::Timeout => json!({ "message": "The request timed out" }),
            AppError::AlreadyExists { message } => json!({ "status": 1, "message": message }),
            AppError::MethodNotSupported(method) => json!({
                "message": format!("The {} method was not supported by the resource", method)
            }),
            // Internal details only ever reach the log.
            AppError::Internal(_) => json!({ "message": "An internal server error occurred" }),
        };

        (status, Json(body)).into_response()
    }
}
