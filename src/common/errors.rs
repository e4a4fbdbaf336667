use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::sheets::workbook::SheetError;

/// Failures surfaced to API callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Bad upload or query parameters (400 Bad Request)
    ValidationError { field: String, message: String },
    /// Resource not found (404 Not Found)
    NotFound { resource: String, id: String },
    /// The upload is not a readable workbook (422 Unprocessable Entity)
    UnreadableWorkbook { message: String },
    /// Generic application error (500 Internal Server Error)
    InternalError { message: String },
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND"),
            AppError::UnreadableWorkbook { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNREADABLE_WORKBOOK")
            }
            AppError::InternalError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError { field, message } => {
                write!(f, "Validation error in field '{field}': {message}")
            }
            AppError::NotFound { resource, id } => {
                write!(f, "{resource} '{id}' not found")
            }
            AppError::UnreadableWorkbook { message } => {
                write!(f, "Excel processing error: {message}")
            }
            AppError::InternalError { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<SheetError> for AppError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::WorksheetNotFound { ref requested, .. } => AppError::NotFound {
                resource: "Worksheet".to_string(),
                id: requested.clone(),
            },
            SheetError::Decode { .. } | SheetError::NoWorksheets => {
                AppError::UnreadableWorkbook {
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError {
            message: format!("Worksheet processing task failed: {err}"),
        }
    }
}

/// Convert AppError to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!("Request rejected: {self}");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Convenience macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($field:expr, $message:expr) => {
        $crate::common::errors::AppError::ValidationError {
            field: $field.to_string(),
            message: $message.to_string(),
        }
    };
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
