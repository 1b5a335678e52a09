use axum::{http::StatusCode, response::Json};
use prost::Message;
use tonic::{Code, Status};
use tracing::error;
use zapeat_proto::common::ValidationErrors;

use crate::models::{ApiErrorResponse, FieldError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    AuthenticationFailed,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Permission denied")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },
    #[error("{0}")]
    Conflict(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationFailed | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Decodes the field violations attached to an `InvalidArgument` status.
fn field_errors(status: &Status) -> Vec<FieldError> {
    if status.details().is_empty() {
        return Vec::new();
    }
    match ValidationErrors::decode(status.details()) {
        Ok(errors) => errors
            .violations
            .into_iter()
            .map(|v| FieldError {
                field: v.field,
                description: v.description,
            })
            .collect(),
        Err(e) => {
            error!("Undecodable validation details: {e}");
            Vec::new()
        }
    }
}

impl From<Status> for ApiError {
    fn from(status: Status) -> Self {
        match status.code() {
            Code::InvalidArgument => ApiError::Validation {
                details: field_errors(&status),
                message: status.message().to_string(),
            },
            Code::NotFound => ApiError::NotFound(status.message().to_string()),
            Code::FailedPrecondition | Code::AlreadyExists => {
                ApiError::Conflict(status.message().to_string())
            }
            Code::Unauthenticated => ApiError::InvalidToken,
            Code::PermissionDenied => ApiError::Forbidden,
            Code::Unavailable => ApiError::ServiceUnavailable(status.message().to_string()),
            _ => {
                error!("Upstream error: {status}");
                ApiError::InternalError(status.message().to_string())
            }
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error = self.to_string();
        let details = match self {
            ApiError::Validation { details, .. } => details,
            _ => Vec::new(),
        };

        (status, Json(ApiErrorResponse { error, details })).into_response()
    }
}
