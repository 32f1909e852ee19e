//! Notification records produced by complaint transitions.

use crate::complaint::{ComplaintCode, ComplaintStatus};
use crate::errors::DomainError;
use crate::identifiers::{AdminId, ComplaintId, NotificationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type tag carried by a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// A complaint arrived at the recipient's office, by submission or forward
    ComplaintSubmitted,
    /// The recipient's complaint changed status
    StatusChanged,
    /// A complaint was assigned to the recipient
    Assigned,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComplaintSubmitted => "complaint_submitted",
            Self::StatusChanged => "status_changed",
            Self::Assigned => "assigned",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complaint_submitted" => Ok(Self::ComplaintSubmitted),
            "status_changed" => Ok(Self::StatusChanged),
            "assigned" => Ok(Self::Assigned),
            other => Err(DomainError::InvalidNotificationType(other.to_string())),
        }
    }
}

/// Who a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    Citizen(UserId),
    Admin(AdminId),
}

/// A delivered notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: Recipient,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub complaint_id: ComplaintId,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification about to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub recipient: Recipient,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub complaint_id: ComplaintId,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    pub fn into_notification(self, id: NotificationId) -> Notification {
        Notification {
            id,
            recipient: self.recipient,
            kind: self.kind,
            title: self.title,
            message: self.message,
            complaint_id: self.complaint_id,
            is_read: false,
            created_at: self.created_at,
        }
    }
}

/// Title and body of a notification, before it is addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
}

impl NotificationTemplate {
    /// Sent to every active union office admin on submission
    pub fn submitted(title: &str, code: &ComplaintCode) -> Self {
        Self {
            kind: NotificationType::ComplaintSubmitted,
            title: "New Complaint Submitted".to_string(),
            message: format!(
                "New complaint \"{}\" has been submitted with ID {}",
                title, code
            ),
        }
    }

    /// Sent to the submitter when the status changes
    pub fn status_changed(title: &str, status: ComplaintStatus) -> Self {
        Self {
            kind: NotificationType::StatusChanged,
            title: "Complaint Status Updated".to_string(),
            message: format!(
                "Your complaint \"{}\" status has been updated to {}",
                title, status
            ),
        }
    }

    /// Sent to the new assignee
    pub fn assigned(title: &str, code: &ComplaintCode) -> Self {
        Self {
            kind: NotificationType::Assigned,
            title: "Complaint Assigned".to_string(),
            message: format!(
                "Complaint \"{}\" ({}) has been assigned to you",
                title, code
            ),
        }
    }

    /// Sent to every active admin of the receiving office
    pub fn forwarded(title: &str, code: &ComplaintCode) -> Self {
        Self {
            kind: NotificationType::ComplaintSubmitted,
            title: "Complaint Forwarded".to_string(),
            message: format!(
                "Complaint \"{}\" ({}) has been forwarded to your office",
                title, code
            ),
        }
    }

    /// Address the template to one recipient
    pub fn addressed_to(
        &self,
        recipient: Recipient,
        complaint_id: ComplaintId,
        at: DateTime<Utc>,
    ) -> NewNotification {
        NewNotification {
            recipient,
            kind: self.kind,
            title: self.title.clone(),
            message: self.message.clone(),
            complaint_id,
            created_at: at,
        }
    }
}
