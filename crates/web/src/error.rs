use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use intelligence::IntelligenceError;
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Intelligence(IntelligenceError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    NotFound,
    #[allow(dead_code)]
    InternalServerError(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Intelligence(e) => write!(f, "Intelligence error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::NotFound => write!(f, "Resource not found"),
            Self::InternalServerError(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::InvalidState(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Intelligence(IntelligenceError::AnalysisNotFound) => StatusCode::NOT_FOUND,
            Self::Intelligence(IntelligenceError::NotAuthorized) => StatusCode::FORBIDDEN,
            Self::Intelligence(IntelligenceError::PlanAlreadyExists) => StatusCode::BAD_REQUEST,
            Self::Intelligence(IntelligenceError::NoIssuesDetected) => StatusCode::BAD_REQUEST,
            Self::Intelligence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            // State and constraint violations carry the user-facing message
            // verbatim; internal failures never leak details.
            Self::Storage(StorageError::NotFound) => {
                json!({ "error": "Resource not found" })
            }
            Self::Storage(StorageError::ConstraintViolation(msg))
            | Self::Storage(StorageError::InvalidState(msg)) => {
                json!({ "error": msg })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({ "error": "An internal error occurred" })
            }
            Self::Intelligence(
                e @ (IntelligenceError::AnalysisNotFound
                | IntelligenceError::NotAuthorized
                | IntelligenceError::PlanAlreadyExists
                | IntelligenceError::NoIssuesDetected),
            ) => {
                json!({ "error": e.to_string() })
            }
            Self::Intelligence(e) => {
                tracing::error!("Intelligence error: {:?}", e);
                json!({ "error": "An internal error occurred" })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::BadRequest(msg) => {
                json!({ "error": msg })
            }
            Self::Unauthorized => {
                json!({ "error": "Unauthorized" })
            }
            Self::Forbidden(msg) => {
                json!({ "error": msg })
            }
            Self::NotFound => {
                json!({ "error": "Resource not found" })
            }
            Self::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                json!({ "error": "An internal error occurred" })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<IntelligenceError> for WebError {
    fn from(error: IntelligenceError) -> Self {
        Self::Intelligence(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}
