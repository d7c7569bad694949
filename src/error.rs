use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Message returned for every internal failure; causes stay in the logs.
pub const GENERIC_ERROR: &str = "there was an error";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    /// `public` is sent to the client, `cause` is only logged.
    #[error("{public}: {cause}")]
    Internal {
        public: &'static str,
        cause: anyhow::Error,
    },
}

impl AppError {
    pub fn internal(cause: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            public: GENERIC_ERROR,
            cause: cause.into(),
        }
    }

    pub fn internal_with(public: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            public,
            cause: cause.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Conflict(msg) | Self::NotFound(msg) | Self::Unauthorized(msg) => {
                json!({ "error": msg })
            }
            Self::Validation(errors) => json!({ "errors": errors }),
            Self::Internal { public, cause } => {
                error!(error = ?cause, "internal error");
                json!({ "error": public })
            }
        };
        (status, Json(body)).into_response()
    }
}
