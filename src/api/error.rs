//! Mapping from task access errors to HTTP responses.

use super::types::MessageEnvelope;
use crate::task::services::TaskAccessError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Error returned by task route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body, path, or a field value is invalid.
    #[error("{0}")]
    BadRequest(String),
    /// No task with the requested id exists.
    #[error("Task not found")]
    NotFound,
    /// The task exists but the requester does not own it.
    #[error("Not authorized to {0} this task")]
    Unauthorized(&'static str),
    /// Storage failed.
    #[error("Server error")]
    Internal,
}

impl ApiError {
    /// Converts a service error raised while performing `action` (for
    /// example `"update"`) on a task.
    #[must_use]
    pub fn from_access(err: TaskAccessError, action: &'static str) -> Self {
        match err {
            TaskAccessError::Validation(domain) => Self::BadRequest(domain.to_string()),
            TaskAccessError::NotFound(_) => Self::NotFound,
            TaskAccessError::Unauthorized(_) => Self::Unauthorized(action),
            TaskAccessError::Transient(source) => {
                tracing::error!(error = %source, action, "task storage failure");
                Self::Internal
            }
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = MessageEnvelope {
            success: false,
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
