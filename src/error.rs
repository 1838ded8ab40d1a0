use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{dao::storage::StorageError, state::slots::SlotViolation};

/// Failures raised by the service layer, independent of the HTTP surface.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The storage backend failed while serving the request.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// No storage is connected right now.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidInput(String),
    /// The request conflicts with what is stored, e.g. a slot taken concurrently.
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<SlotViolation> for ServiceError {
    fn from(err: SlotViolation) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

/// HTTP-facing error: a status code and the message sent back as `{ "message": ... }`.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::Unavailable(StorageError::Corrupted { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Unavailable(_) | ServiceError::Degraded => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidState(_) => StatusCode::CONFLICT,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let message = match err {
            ServiceError::Unavailable(source) => source.to_string(),
            other => other.to_string(),
        };
        Self::new(status, message)
    }
}

/// Undecodable JSON bodies are client errors like any other malformed input.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}
