//! Persistence ports
//!
//! The engine and query services are written against these traits. Every
//! store lists newest first unless stated otherwise.

use crate::ApplicationResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use vcm_common::PaginationParams;
use vcm_domain::{
    AdminId, AdminPrincipal, AdminRole, Category, CategoryId, Complaint, ComplaintCode,
    ComplaintId, ComplaintStatus, NewComplaint, NewHistoryEntry, NewNotification, Notification,
    NotificationId, Office, Recipient, StatusHistoryEntry, Urgency, UserId,
};

/// Filters shared by every complaint listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintFilter {
    /// Restrict to complaints held by this office
    pub office: Option<Office>,
    pub status: Option<ComplaintStatus>,
    pub urgency: Option<Urgency>,
    pub category_id: Option<CategoryId>,
    pub submitter: Option<UserId>,
    /// Substring of title, description or complaint code
    pub search: Option<String>,
}

impl ComplaintFilter {
    /// In-memory evaluation of the filter
    pub fn matches(&self, complaint: &Complaint) -> bool {
        if self.office.is_some_and(|o| o != complaint.current_office) {
            return false;
        }
        if self.status.is_some_and(|s| s != complaint.status) {
            return false;
        }
        if self.urgency.is_some_and(|u| u != complaint.urgency) {
            return false;
        }
        if self.category_id.is_some_and(|c| c != complaint.category_id) {
            return false;
        }
        if self.submitter.is_some() && self.submitter != complaint.submitter {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                complaint.title.to_lowercase().contains(&term)
                    || complaint.description.to_lowercase().contains(&term)
                    || complaint.code.as_str().to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

/// Aggregate counts over a set of complaints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintTally {
    pub total: u64,
    pub by_status: Vec<(ComplaintStatus, u64)>,
    pub by_urgency: Vec<(Urgency, u64)>,
    pub by_category: Vec<(CategoryId, u64)>,
    /// Complaints created at or after the requested instant
    pub created_since: u64,
}

impl ComplaintTally {
    pub fn count_for_status(&self, status: ComplaintStatus) -> u64 {
        self.by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Complaint store
#[async_trait]
pub trait ComplaintRepositoryPort: Send + Sync {
    /// Insert a new complaint; a duplicate code is a `Conflict`.
    async fn insert(&self, complaint: NewComplaint) -> ApplicationResult<Complaint>;

    async fn find_by_id(&self, id: ComplaintId) -> ApplicationResult<Option<Complaint>>;

    async fn find_by_code(&self, code: &ComplaintCode) -> ApplicationResult<Option<Complaint>>;

    /// Persist `complaint` if the stored version still equals `complaint.version`.
    ///
    /// Returns the stored record with its version bumped. A stale version is a
    /// `Conflict`; a missing row is `NotFound`.
    async fn update(&self, complaint: &Complaint) -> ApplicationResult<Complaint>;

    /// Page of matching complaints ordered by creation time descending, plus the total.
    async fn list(
        &self,
        filter: &ComplaintFilter,
        page: &PaginationParams,
    ) -> ApplicationResult<(Vec<Complaint>, u64)>;

    /// Counts over complaints held by `office`, or over all when `None`.
    async fn tally(
        &self,
        office: Option<Office>,
        created_since: DateTime<Utc>,
    ) -> ApplicationResult<ComplaintTally>;
}

/// Append-only status history ledger
#[async_trait]
pub trait StatusHistoryRepositoryPort: Send + Sync {
    async fn append(&self, entry: NewHistoryEntry) -> ApplicationResult<StatusHistoryEntry>;

    /// Entries for one complaint, oldest first
    async fn list_for_complaint(
        &self,
        complaint_id: ComplaintId,
    ) -> ApplicationResult<Vec<StatusHistoryEntry>>;
}

/// Notification store
#[async_trait]
pub trait NotificationRepositoryPort: Send + Sync {
    async fn insert(&self, notification: NewNotification) -> ApplicationResult<Notification>;

    async fn list_for_recipient(
        &self,
        recipient: Recipient,
        unread_only: bool,
        page: &PaginationParams,
    ) -> ApplicationResult<(Vec<Notification>, u64)>;

    /// Mark one notification read; false when it does not belong to `recipient`.
    async fn mark_read(&self, recipient: Recipient, id: NotificationId) -> ApplicationResult<bool>;

    /// Mark every unread notification of `recipient` read, returning how many changed.
    async fn mark_all_read(&self, recipient: Recipient) -> ApplicationResult<u64>;
}

/// Admin principal directory
#[async_trait]
pub trait AdminDirectoryPort: Send + Sync {
    async fn find(&self, id: AdminId) -> ApplicationResult<Option<AdminPrincipal>>;

    /// Active admins ordered by name, optionally of one role
    async fn list_active(&self, role: Option<AdminRole>) -> ApplicationResult<Vec<AdminPrincipal>>;
}

/// Category registry
#[async_trait]
pub trait CategoryRepositoryPort: Send + Sync {
    /// Exact-name lookup among active categories
    async fn resolve_active(&self, name: &str) -> ApplicationResult<Option<Category>>;

    /// Exact-name lookup, retired categories included
    async fn resolve(&self, name: &str) -> ApplicationResult<Option<Category>>;

    /// Active categories ordered by name
    async fn list_active(&self) -> ApplicationResult<Vec<Category>>;

    /// Every category ever registered, ordered by name
    async fn list_all(&self) -> ApplicationResult<Vec<Category>>;
}

/// Liveness of the persistence substrate
#[async_trait]
pub trait StoreHealthPort: Send + Sync {
    async fn check(&self) -> ApplicationResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vcm_domain::{ComplaintCode, ContactInfo};

    fn complaint() -> Complaint {
        NewComplaint {
            code: ComplaintCode::compose(1_700_000_123_456, 7),
            title: "Street light out".to_string(),
            description: "The street light near the temple has been off for weeks".to_string(),
            location: "Temple road".to_string(),
            urgency: Urgency::High,
            category_id: CategoryId::new(3),
            submitter: Some(UserId::new(42)),
            contact: Some(ContactInfo {
                name: "Ravi".to_string(),
                phone: "9000000000".to_string(),
                email: None,
            }),
            is_anonymous: false,
            attachments: vec![],
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        }
        .into_complaint(ComplaintId::new(1))
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(ComplaintFilter::default().matches(&complaint()));
    }

    #[test]
    fn test_filter_fields() {
        let c = complaint();

        let by_office = ComplaintFilter {
            office: Some(Office::CollectorOffice),
            ..Default::default()
        };
        assert!(!by_office.matches(&c));

        let by_submitter = ComplaintFilter {
            submitter: Some(UserId::new(42)),
            urgency: Some(Urgency::High),
            ..Default::default()
        };
        assert!(by_submitter.matches(&c));

        let other_submitter = ComplaintFilter {
            submitter: Some(UserId::new(7)),
            ..Default::default()
        };
        assert!(!other_submitter.matches(&c));
    }

    #[test]
    fn test_search_is_case_insensitive_over_code_and_text() {
        let c = complaint();
        for term in ["temple", "STREET", "vcm123456"] {
            let filter = ComplaintFilter {
                search: Some(term.to_string()),
                ..Default::default()
            };
            assert!(filter.matches(&c), "term {term} should match");
        }

        let miss = ComplaintFilter {
            search: Some("pothole".to_string()),
            ..Default::default()
        };
        assert!(!miss.matches(&c));
    }
}
