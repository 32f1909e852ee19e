//! Status history ledger entries.
//!
//! Every transition a complaint goes through leaves exactly one immutable
//! entry. Assignments and forwards do not change the status, so their entries
//! record the current status on both sides.

use crate::complaint::{ComplaintStatus, Office};
use crate::identifiers::{AdminId, ComplaintId, HistoryEntryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry as stored in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: HistoryEntryId,
    pub complaint_id: ComplaintId,
    /// `None` only for the creation entry
    pub old_status: Option<ComplaintStatus>,
    pub new_status: ComplaintStatus,
    pub comment: Option<String>,
    /// `None` for system-generated entries
    pub changed_by: Option<AdminId>,
    pub created_at: DateTime<Utc>,
}

/// An entry about to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryEntry {
    pub complaint_id: ComplaintId,
    pub old_status: Option<ComplaintStatus>,
    pub new_status: ComplaintStatus,
    pub comment: Option<String>,
    pub changed_by: Option<AdminId>,
    pub created_at: DateTime<Utc>,
}

impl NewHistoryEntry {
    /// Entry recorded when a complaint is submitted
    pub fn created(complaint_id: ComplaintId, at: DateTime<Utc>) -> Self {
        Self {
            complaint_id,
            old_status: None,
            new_status: ComplaintStatus::Pending,
            comment: Some("Complaint submitted".to_string()),
            changed_by: None,
            created_at: at,
        }
    }

    /// Entry recorded for a status change
    pub fn status_changed(
        complaint_id: ComplaintId,
        old_status: ComplaintStatus,
        new_status: ComplaintStatus,
        comment: Option<String>,
        admin: AdminId,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            complaint_id,
            old_status: Some(old_status),
            new_status,
            comment: non_empty(comment),
            changed_by: Some(admin),
            created_at: at,
        }
    }

    /// Entry recorded for an assignment; the status is unchanged
    pub fn assigned(
        complaint_id: ComplaintId,
        status: ComplaintStatus,
        assignee_name: &str,
        comment: Option<&str>,
        admin: AdminId,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            complaint_id,
            old_status: Some(status),
            new_status: status,
            comment: Some(annotate(&format!("Assigned to {}", assignee_name), comment)),
            changed_by: Some(admin),
            created_at: at,
        }
    }

    /// Entry recorded for a forward; the status is unchanged
    pub fn forwarded(
        complaint_id: ComplaintId,
        status: ComplaintStatus,
        target: Office,
        comment: Option<&str>,
        admin: AdminId,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            complaint_id,
            old_status: Some(status),
            new_status: status,
            comment: Some(annotate(&format!("Forwarded to {}", target), comment)),
            changed_by: Some(admin),
            created_at: at,
        }
    }

    pub fn into_entry(self, id: HistoryEntryId) -> StatusHistoryEntry {
        StatusHistoryEntry {
            id,
            complaint_id: self.complaint_id,
            old_status: self.old_status,
            new_status: self.new_status,
            comment: self.comment,
            changed_by: self.changed_by,
            created_at: self.created_at,
        }
    }
}

fn non_empty(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn annotate(summary: &str, comment: Option<&str>) -> String {
    match comment.map(str::trim).filter(|c| !c.is_empty()) {
        Some(extra) => format!("{}. {}", summary, extra),
        None => format!("{}.", summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_entry_has_no_prior_status() {
        let entry = NewHistoryEntry::created(ComplaintId::new(1), Utc::now());
        assert_eq!(entry.old_status, None);
        assert_eq!(entry.new_status, ComplaintStatus::Pending);
        assert_eq!(entry.changed_by, None);
    }

    #[test]
    fn test_assignment_comment_names_assignee() {
        let entry = NewHistoryEntry::assigned(
            ComplaintId::new(1),
            ComplaintStatus::Acknowledged,
            "Ravi Kumar",
            Some("Please visit the site"),
            AdminId::new(9),
            Utc::now(),
        );
        assert_eq!(entry.old_status, Some(entry.new_status));
        assert_eq!(
            entry.comment.as_deref(),
            Some("Assigned to Ravi Kumar. Please visit the site")
        );
    }

    #[test]
    fn test_forward_comment_without_extra_text() {
        let entry = NewHistoryEntry::forwarded(
            ComplaintId::new(1),
            ComplaintStatus::Pending,
            Office::CollectorOffice,
            Some("   "),
            AdminId::new(9),
            Utc::now(),
        );
        assert_eq!(entry.comment.as_deref(), Some("Forwarded to collector_office."));
    }

    #[test]
    fn test_blank_status_comment_is_dropped() {
        let entry = NewHistoryEntry::status_changed(
            ComplaintId::new(1),
            ComplaintStatus::Pending,
            ComplaintStatus::Acknowledged,
            Some("  ".to_string()),
            AdminId::new(2),
            Utc::now(),
        );
        assert_eq!(entry.comment, None);
    }
}
