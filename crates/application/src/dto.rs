//! Data transfer objects
//!
//! Inputs accepted by the services and the read models they return.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use vcm_domain::{
    AdminId, AdminPrincipal, AdminRole, ComplaintCode, ComplaintId, ComplaintStatus, ContactInfo,
    Office, StatusHistoryEntry, Urgency, UserId,
};

/// Public search results show at most this many characters of the description
pub const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// A complaint as submitted by a citizen
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitComplaintInput {
    pub title: String,
    pub description: String,
    /// Category name, resolved against the registry
    pub category: String,
    pub location: String,
    pub urgency: Urgency,
    pub contact: Option<ContactInfo>,
    pub is_anonymous: bool,
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub id: ComplaintId,
    pub complaint_code: ComplaintCode,
    pub status: ComplaintStatus,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub old_status: ComplaintStatus,
    pub new_status: ComplaintStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssigneeSummary {
    pub id: AdminId,
    pub name: String,
    pub role: AdminRole,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentReceipt {
    pub assigned_to: AssigneeSummary,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardReceipt {
    pub target_office: Office,
    pub forwarded_at: DateTime<Utc>,
}

/// Directory entry shown to admins choosing an assignee
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminSummary {
    pub id: AdminId,
    pub username: String,
    pub email: String,
    pub role: AdminRole,
    pub name: String,
    pub department: Option<String>,
    pub designation: Option<String>,
}

impl From<AdminPrincipal> for AdminSummary {
    fn from(admin: AdminPrincipal) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            email: admin.email,
            role: admin.role,
            name: admin.name,
            department: admin.department,
            designation: admin.designation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssigneeView {
    pub id: AdminId,
    pub name: String,
    pub designation: Option<String>,
}

/// A complaint joined with its category and assignee names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintView {
    pub id: ComplaintId,
    pub complaint_code: ComplaintCode,
    pub title: String,
    pub description: String,
    pub location: String,
    pub urgency: Urgency,
    pub status: ComplaintStatus,
    pub current_office: Office,
    pub category_name: Option<String>,
    pub assigned_to: Option<AssigneeView>,
    pub is_anonymous: bool,
    pub attachments: Vec<String>,
    /// Withheld from public views
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitter: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ComplaintView {
    /// Drop everything that identifies the complainant
    pub fn redacted(mut self) -> Self {
        self.contact = None;
        self.submitter = None;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub old_status: Option<ComplaintStatus>,
    pub new_status: ComplaintStatus,
    pub comment: Option<String>,
    pub changed_by_name: Option<String>,
    pub changed_by_designation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HistoryView {
    pub fn new(entry: StatusHistoryEntry, actor: Option<&AdminPrincipal>) -> Self {
        Self {
            old_status: entry.old_status,
            new_status: entry.new_status,
            comment: entry.comment,
            changed_by_name: actor.map(|a| a.name.clone()),
            changed_by_designation: actor.and_then(|a| a.designation.clone()),
            created_at: entry.created_at,
        }
    }
}

/// A complaint with its full status history, oldest entry first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintDetail {
    pub complaint: ComplaintView,
    pub status_history: Vec<HistoryView>,
}

/// Limited public view returned by search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintSearchItem {
    pub complaint_code: ComplaintCode,
    pub title: String,
    pub description_preview: String,
    pub location: String,
    pub urgency: Urgency,
    pub status: ComplaintStatus,
    pub current_office: Office,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// First `DESCRIPTION_PREVIEW_CHARS` characters of `description`
pub fn preview(description: &str) -> String {
    description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Public, system-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintStatistics {
    pub total_complaints: u64,
    pub resolved_complaints: u64,
    /// Rounded percentage of complaints resolved
    pub resolution_rate: u32,
    pub complaints_by_status: BTreeMap<String, u64>,
    pub complaints_by_category: Vec<CategoryCount>,
}

/// Office-scoped dashboard for an admin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_complaints: u64,
    /// Created within the last seven days
    pub recent_complaints: u64,
    pub complaints_by_status: BTreeMap<String, u64>,
    pub complaints_by_urgency: BTreeMap<String, u64>,
    pub complaints_by_category: Vec<CategoryCount>,
}

/// Rounded percentage; zero when there is nothing to divide by
pub fn resolution_rate(resolved: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((resolved as f64 / total as f64) * 100.0).round() as u32
}
