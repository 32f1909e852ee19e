//! Application layer for the village complaint service
//!
//! This crate orchestrates the complaint workflow over persistence ports.
//!
//! ## Modules
//!
//! - `ports` - Async traits the stores implement
//! - `services` - Access guard, escalation engine, notification dispatch and queries
//! - `outcome` - Committed results that record degraded secondary effects
//! - `dto` - Inputs and read models handed to the API layer

pub mod dto;
pub mod outcome;
pub mod ports;
pub mod services;

// Re-export commonly used types
pub use outcome::{Committed, DegradedEffect, SideEffect};
pub use services::{
    AccessGuard, AdminComplaintQuery, ComplaintQueryService, EscalationEngine,
    IdentityAssertion, NotificationDispatcher, NotificationService, PublicSearchQuery,
    Repositories, ServiceConfig,
};

use thiserror::Error;
use vcm_domain::DomainError;

/// Application-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplicationError {
    /// Complaint absent or outside the caller's authority
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid office: {0}")]
    InvalidOffice(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid assignee: {0}")]
    InvalidAssignee(String),

    /// Forward that does not climb the office hierarchy
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Missing, invalid or expired credential, or a revoked admin
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credential of the wrong kind for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Duplicate key or lost optimistic update
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence substrate failure
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Get HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            ApplicationError::NotFound(_) => 404,
            ApplicationError::InvalidStatus(_)
            | ApplicationError::InvalidOffice(_)
            | ApplicationError::InvalidCategory(_)
            | ApplicationError::InvalidAssignee(_)
            | ApplicationError::InvalidTransition(_) => 400,
            ApplicationError::Unauthorized(_) => 401,
            ApplicationError::Forbidden(_) => 403,
            ApplicationError::ValidationFailed(_) => 422,
            ApplicationError::Conflict(_) => 409,
            ApplicationError::Storage(_) => 503,
            ApplicationError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ApplicationError::NotFound(_) => "NOT_FOUND",
            ApplicationError::InvalidStatus(_) => "INVALID_STATUS",
            ApplicationError::InvalidOffice(_) => "INVALID_OFFICE",
            ApplicationError::InvalidCategory(_) => "INVALID_CATEGORY",
            ApplicationError::InvalidAssignee(_) => "INVALID_ASSIGNEE",
            ApplicationError::InvalidTransition(_) => "INVALID_TRANSITION",
            ApplicationError::Unauthorized(_) => "UNAUTHORIZED",
            ApplicationError::Forbidden(_) => "FORBIDDEN",
            ApplicationError::ValidationFailed(_) => "VALIDATION_FAILED",
            ApplicationError::Conflict(_) => "CONFLICT",
            ApplicationError::Storage(_) => "STORAGE_ERROR",
            ApplicationError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the message may contain internals that must not reach callers
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ApplicationError::Storage(_) | ApplicationError::Internal(_)
        )
    }

    /// The uniform "not found or not yours" error for complaints
    pub fn complaint_not_found() -> Self {
        ApplicationError::NotFound("Complaint not found or access denied".to_string())
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidStatus(_) => ApplicationError::InvalidStatus(err.to_string()),
            DomainError::InvalidOffice(_) => ApplicationError::InvalidOffice(err.to_string()),
            DomainError::InvalidTransition { .. } => {
                ApplicationError::InvalidTransition(err.to_string())
            }
            DomainError::InvalidComplaintCode(_) => ApplicationError::NotFound(err.to_string()),
            DomainError::InvalidUrgency(_)
            | DomainError::InvalidRole(_)
            | DomainError::InvalidNotificationType(_) => {
                ApplicationError::ValidationFailed(err.to_string())
            }
        }
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use vcm_domain::Office;

    #[test]
    fn test_error_http_status() {
        assert_eq!(ApplicationError::complaint_not_found().http_status(), 404);
        assert_eq!(ApplicationError::Unauthorized("test".to_string()).http_status(), 401);
        assert_eq!(ApplicationError::Forbidden("test".to_string()).http_status(), 403);
        assert_eq!(ApplicationError::InvalidTransition("test".to_string()).http_status(), 400);
        assert_eq!(ApplicationError::ValidationFailed("test".to_string()).http_status(), 422);
        assert_eq!(ApplicationError::Conflict("test".to_string()).http_status(), 409);
        assert_eq!(ApplicationError::Internal("test".to_string()).http_status(), 500);
    }

    #[test]
    fn test_domain_errors_map_to_taxonomy() {
        let err: ApplicationError = DomainError::InvalidTransition {
            from: Office::CollectorOffice,
            to: Office::UnionOffice,
        }
        .into();
        assert_eq!(err.error_code(), "INVALID_TRANSITION");

        let err: ApplicationError = DomainError::InvalidStatus("closed".to_string()).into();
        assert_eq!(err.error_code(), "INVALID_STATUS");

        let err: ApplicationError = DomainError::InvalidComplaintCode("abc".to_string()).into();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_internal_errors_are_flagged() {
        assert!(ApplicationError::Storage("pool timed out".to_string()).is_internal());
        assert!(!ApplicationError::complaint_not_found().is_internal());
    }
}
