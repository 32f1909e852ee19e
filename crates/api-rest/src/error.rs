//! HTTP error handling and conversion.
//!
//! Application errors keep their stable code and status. Transport failures
//! (bad JSON, bad bearer, failed validation) are added on top.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use vcm_application::ApplicationError;
use vcm_domain::DomainError;

/// Replaces storage and internal messages in responses
const GENERIC_FAILURE: &str = "An internal error occurred, please try again later";

/// API-specific error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Application layer error
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// No bearer credential on a route that requires one
    #[error("Access token required")]
    Unauthorized,

    /// Bearer present but unreadable, badly signed or expired
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Request body failed field validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Malformed JSON, path or query
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Application(err) => StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Unauthorized | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get error code for API response
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Application(err) => err.error_code(),
            Self::Unauthorized | Self::InvalidToken(_) => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
        }
    }

    /// Message safe to show the caller
    pub fn public_message(&self) -> String {
        match self {
            Self::Application(err) if err.is_internal() => GENERIC_FAILURE.to_string(),
            Self::Application(err) => application_message(err),
            other => other.to_string(),
        }
    }
}

/// The inner text of an application error, without the variant prefix
fn application_message(err: &ApplicationError) -> String {
    match err {
        ApplicationError::NotFound(msg)
        | ApplicationError::InvalidStatus(msg)
        | ApplicationError::InvalidOffice(msg)
        | ApplicationError::InvalidCategory(msg)
        | ApplicationError::InvalidAssignee(msg)
        | ApplicationError::InvalidTransition(msg)
        | ApplicationError::Unauthorized(msg)
        | ApplicationError::Forbidden(msg)
        | ApplicationError::ValidationFailed(msg)
        | ApplicationError::Conflict(msg)
        | ApplicationError::Storage(msg)
        | ApplicationError::Internal(msg) => msg.clone(),
    }
}

/// Standardized error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,

    /// Error code
    pub error: String,

    /// Human-readable message
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error_code = self.error_code(), error = %self, "Request failed");
        }

        let body = ErrorResponse::new(self.error_code(), self.public_message());
        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Application(err.into())
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_status_is_preserved() {
        let err = ApiError::from(ApplicationError::complaint_not_found());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.public_message(), "Complaint not found or access denied");
    }

    #[test]
    fn test_storage_details_are_hidden() {
        let err = ApiError::from(ApplicationError::Storage(
            "connection refused at 10.0.0.4:5432".to_string(),
        ));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.public_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_domain_errors_become_bad_requests() {
        let err = ApiError::from(DomainError::InvalidOffice("district_office".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_OFFICE");
    }

    #[test]
    fn test_transport_errors() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Validation("title".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
    }
}
