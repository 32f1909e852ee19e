//! Error types for the complaint management domain.
//!
//! Domain errors describe bad enumerated input and forbidden transitions. They
//! carry no I/O concerns; the application layer maps them onto its caller-facing
//! taxonomy.

use crate::complaint::Office;

/// Errors raised by domain value types and transition rules
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Unrecognised complaint status
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Unrecognised office
    #[error("Invalid office: {0}")]
    InvalidOffice(String),

    /// Unrecognised urgency level
    #[error("Invalid urgency: {0}")]
    InvalidUrgency(String),

    /// Unrecognised admin role
    #[error("Invalid admin role: {0}")]
    InvalidRole(String),

    /// Unrecognised notification type tag
    #[error("Invalid notification type: {0}")]
    InvalidNotificationType(String),

    /// Malformed complaint code
    #[error("Invalid complaint code: {0}")]
    InvalidComplaintCode(String),

    /// Forward to an office that does not outrank the current one
    #[error("Cannot forward from {from} to {to}: target office must be higher in the hierarchy")]
    InvalidTransition {
        /// Office currently holding the complaint
        from: Office,
        /// Requested target office
        to: Office,
    },
}

impl DomainError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::InvalidOffice(_) => "INVALID_OFFICE",
            Self::InvalidUrgency(_) => "INVALID_URGENCY",
            Self::InvalidRole(_) => "INVALID_ROLE",
            Self::InvalidNotificationType(_) => "INVALID_NOTIFICATION_TYPE",
            Self::InvalidComplaintCode(_) => "INVALID_COMPLAINT_CODE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_message_names_both_offices() {
        let err = DomainError::InvalidTransition {
            from: Office::CollectorOffice,
            to: Office::UnionOffice,
        };
        let message = err.to_string();
        assert!(message.contains("collector_office"));
        assert!(message.contains("union_office"));
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }
}
