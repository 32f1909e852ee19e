//! In-memory repositories
//!
//! Same contracts as the Postgres stores, held behind `parking_lot` locks.
//! Used by the test harness and by the server when no database URL is
//! configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::debug;

use vcm_application::ports::{
    AdminDirectoryPort, CategoryRepositoryPort, ComplaintFilter, ComplaintRepositoryPort,
    ComplaintTally, NotificationRepositoryPort, StatusHistoryRepositoryPort, StoreHealthPort,
};
use vcm_application::{ApplicationError, ApplicationResult, Repositories};
use vcm_common::PaginationParams;
use vcm_domain::{
    default_categories, AdminId, AdminPrincipal, AdminRole, Category, CategoryId, Complaint,
    ComplaintCode, ComplaintId, ComplaintStatus, HistoryEntryId, NewComplaint, NewHistoryEntry,
    NewNotification, Notification, NotificationId, Office, Recipient, StatusHistoryEntry,
    Urgency,
};

/// Monotonic id source starting at 1
#[derive(Debug)]
struct Sequence(AtomicI64);

impl Sequence {
    fn new() -> Self {
        Self(AtomicI64::new(1))
    }

    fn next(&self) -> i64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

fn page_of<T: Clone>(items: &[T], page: &PaginationParams) -> (Vec<T>, u64) {
    (page.slice(items), items.len() as u64)
}

/// Complaint store keyed by id
#[derive(Debug)]
pub struct InMemoryComplaintRepository {
    complaints: RwLock<BTreeMap<ComplaintId, Complaint>>,
    ids: Sequence,
}

impl Default for InMemoryComplaintRepository {
    fn default() -> Self {
        Self {
            complaints: RwLock::new(BTreeMap::new()),
            ids: Sequence::new(),
        }
    }
}

impl InMemoryComplaintRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored complaint
    pub fn all(&self) -> Vec<Complaint> {
        self.complaints.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.complaints.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.complaints.read().is_empty()
    }
}

#[async_trait]
impl ComplaintRepositoryPort for InMemoryComplaintRepository {
    async fn insert(&self, complaint: NewComplaint) -> ApplicationResult<Complaint> {
        let mut complaints = self.complaints.write();
        if complaints.values().any(|c| c.code == complaint.code) {
            return Err(ApplicationError::Conflict(format!(
                "complaint code {} already exists",
                complaint.code
            )));
        }

        let stored = complaint.into_complaint(ComplaintId::new(self.ids.next()));
        complaints.insert(stored.id, stored.clone());
        debug!(complaint_id = %stored.id, "Complaint inserted");
        Ok(stored)
    }

    async fn find_by_id(&self, id: ComplaintId) -> ApplicationResult<Option<Complaint>> {
        Ok(self.complaints.read().get(&id).cloned())
    }

    async fn find_by_code(&self, code: &ComplaintCode) -> ApplicationResult<Option<Complaint>> {
        Ok(self
            .complaints
            .read()
            .values()
            .find(|c| &c.code == code)
            .cloned())
    }

    async fn update(&self, complaint: &Complaint) -> ApplicationResult<Complaint> {
        let mut complaints = self.complaints.write();
        let stored = complaints
            .get_mut(&complaint.id)
            .ok_or_else(|| ApplicationError::NotFound(format!("Complaint {}", complaint.id)))?;

        if stored.version != complaint.version {
            return Err(ApplicationError::Conflict(format!(
                "Complaint {} was modified concurrently",
                complaint.id
            )));
        }

        stored.status = complaint.status;
        stored.current_office = complaint.current_office;
        stored.assigned_to = complaint.assigned_to;
        stored.updated_at = complaint.updated_at;
        stored.resolved_at = complaint.resolved_at;
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn list(
        &self,
        filter: &ComplaintFilter,
        page: &PaginationParams,
    ) -> ApplicationResult<(Vec<Complaint>, u64)> {
        let mut matching: Vec<Complaint> = self
            .complaints
            .read()
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page_of(&matching, page))
    }

    async fn tally(
        &self,
        office: Option<Office>,
        created_since: DateTime<Utc>,
    ) -> ApplicationResult<ComplaintTally> {
        let complaints = self.complaints.read();
        let scoped = complaints
            .values()
            .filter(|c| office.map_or(true, |o| c.current_office == o));

        let mut tally = ComplaintTally::default();
        let mut by_status: HashMap<ComplaintStatus, u64> = HashMap::new();
        let mut by_urgency: HashMap<Urgency, u64> = HashMap::new();
        let mut by_category: BTreeMap<CategoryId, u64> = BTreeMap::new();

        for complaint in scoped {
            tally.total += 1;
            if complaint.created_at >= created_since {
                tally.created_since += 1;
            }
            *by_status.entry(complaint.status).or_default() += 1;
            *by_urgency.entry(complaint.urgency).or_default() += 1;
            *by_category.entry(complaint.category_id).or_default() += 1;
        }

        tally.by_status = ComplaintStatus::all()
            .iter()
            .filter_map(|s| by_status.get(s).map(|n| (*s, *n)))
            .collect();
        tally.by_urgency = Urgency::all()
            .iter()
            .filter_map(|u| by_urgency.get(u).map(|n| (*u, *n)))
            .collect();
        tally.by_category = by_category.into_iter().collect();
        Ok(tally)
    }
}

/// Append-only ledger
#[derive(Debug)]
pub struct InMemoryHistoryRepository {
    entries: RwLock<Vec<StatusHistoryEntry>>,
    ids: Sequence,
}

impl Default for InMemoryHistoryRepository {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            ids: Sequence::new(),
        }
    }
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl StatusHistoryRepositoryPort for InMemoryHistoryRepository {
    async fn append(&self, entry: NewHistoryEntry) -> ApplicationResult<StatusHistoryEntry> {
        let stored = entry.into_entry(HistoryEntryId::new(self.ids.next()));
        self.entries.write().push(stored.clone());
        Ok(stored)
    }

    async fn list_for_complaint(
        &self,
        complaint_id: ComplaintId,
    ) -> ApplicationResult<Vec<StatusHistoryEntry>> {
        let mut entries: Vec<StatusHistoryEntry> = self
            .entries
            .read()
            .iter()
            .filter(|e| e.complaint_id == complaint_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(entries)
    }
}

/// Notification store
#[derive(Debug)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<Vec<Notification>>,
    ids: Sequence,
}

impl Default for InMemoryNotificationRepository {
    fn default() -> Self {
        Self {
            notifications: RwLock::new(Vec::new()),
            ids: Sequence::new(),
        }
    }
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification addressed to `recipient`, oldest first
    pub fn addressed_to(&self, recipient: Recipient) -> Vec<Notification> {
        self.notifications
            .read()
            .iter()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.notifications.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.read().is_empty()
    }
}

#[async_trait]
impl NotificationRepositoryPort for InMemoryNotificationRepository {
    async fn insert(&self, notification: NewNotification) -> ApplicationResult<Notification> {
        let stored = notification.into_notification(NotificationId::new(self.ids.next()));
        self.notifications.write().push(stored.clone());
        Ok(stored)
    }

    async fn list_for_recipient(
        &self,
        recipient: Recipient,
        unread_only: bool,
        page: &PaginationParams,
    ) -> ApplicationResult<(Vec<Notification>, u64)> {
        let mut matching: Vec<Notification> = self
            .notifications
            .read()
            .iter()
            .filter(|n| n.recipient == recipient && (!unread_only || !n.is_read))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page_of(&matching, page))
    }

    async fn mark_read(&self, recipient: Recipient, id: NotificationId) -> ApplicationResult<bool> {
        let mut notifications = self.notifications.write();
        match notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient == recipient)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, recipient: Recipient) -> ApplicationResult<u64> {
        let mut changed = 0;
        for notification in self
            .notifications
            .write()
            .iter_mut()
            .filter(|n| n.recipient == recipient && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

/// Admin directory with helpers for seeding and revoking accounts
#[derive(Debug, Default)]
pub struct InMemoryAdminDirectory {
    admins: RwLock<Vec<AdminPrincipal>>,
}

impl InMemoryAdminDirectory {
    pub fn new(admins: Vec<AdminPrincipal>) -> Self {
        Self {
            admins: RwLock::new(admins),
        }
    }

    /// Every admin, active or not
    pub fn snapshot(&self) -> Vec<AdminPrincipal> {
        self.admins.read().clone()
    }

    /// Insert or replace by id
    pub fn upsert(&self, admin: AdminPrincipal) {
        let mut admins = self.admins.write();
        match admins.iter_mut().find(|a| a.id == admin.id) {
            Some(existing) => *existing = admin,
            None => admins.push(admin),
        }
    }

    /// Mark an admin inactive, returning whether it existed
    pub fn deactivate(&self, id: AdminId) -> bool {
        match self.admins.write().iter_mut().find(|a| a.id == id) {
            Some(admin) => {
                admin.is_active = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AdminDirectoryPort for InMemoryAdminDirectory {
    async fn find(&self, id: AdminId) -> ApplicationResult<Option<AdminPrincipal>> {
        Ok(self.admins.read().iter().find(|a| a.id == id).cloned())
    }

    async fn list_active(&self, role: Option<AdminRole>) -> ApplicationResult<Vec<AdminPrincipal>> {
        let mut active: Vec<AdminPrincipal> = self
            .admins
            .read()
            .iter()
            .filter(|a| a.is_active && role.map_or(true, |r| a.role == r))
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(active)
    }
}

/// Category registry
#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<Vec<Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: RwLock::new(categories),
        }
    }

    /// Registry holding the standard category list
    pub fn with_defaults() -> Self {
        Self::new(default_categories())
    }

    /// Retire a category by name, returning whether it was active
    pub fn deactivate(&self, name: &str) -> bool {
        match self
            .categories
            .write()
            .iter_mut()
            .find(|c| c.name == name && c.is_active)
        {
            Some(category) => {
                category.is_active = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CategoryRepositoryPort for InMemoryCategoryRepository {
    async fn resolve_active(&self, name: &str) -> ApplicationResult<Option<Category>> {
        Ok(self
            .categories
            .read()
            .iter()
            .find(|c| c.is_active && c.name == name)
            .cloned())
    }

    async fn resolve(&self, name: &str) -> ApplicationResult<Option<Category>> {
        Ok(self
            .categories
            .read()
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn list_active(&self) -> ApplicationResult<Vec<Category>> {
        let mut active: Vec<Category> = self
            .categories
            .read()
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }

    async fn list_all(&self) -> ApplicationResult<Vec<Category>> {
        let mut all = self.categories.read().clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

/// Health probe that can be flipped to simulate an outage
#[derive(Debug, Default)]
pub struct InMemoryHealth {
    unavailable: RwLock<Option<String>>,
}

impl InMemoryHealth {
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.unavailable.write() = Some(reason.into());
    }

    pub fn recover(&self) {
        *self.unavailable.write() = None;
    }
}

#[async_trait]
impl StoreHealthPort for InMemoryHealth {
    async fn check(&self) -> ApplicationResult<()> {
        match self.unavailable.read().clone() {
            Some(reason) => Err(ApplicationError::Storage(reason)),
            None => Ok(()),
        }
    }
}

/// Concrete handles to every in-memory store
#[derive(Debug, Clone)]
pub struct InMemoryStores {
    pub complaints: Arc<InMemoryComplaintRepository>,
    pub history: Arc<InMemoryHistoryRepository>,
    pub notifications: Arc<InMemoryNotificationRepository>,
    pub admins: Arc<InMemoryAdminDirectory>,
    pub categories: Arc<InMemoryCategoryRepository>,
    pub health: Arc<InMemoryHealth>,
}

impl InMemoryStores {
    /// Empty stores with the default categories and the given admins
    pub fn new(admins: Vec<AdminPrincipal>) -> Self {
        Self {
            complaints: Arc::new(InMemoryComplaintRepository::new()),
            history: Arc::new(InMemoryHistoryRepository::new()),
            notifications: Arc::new(InMemoryNotificationRepository::new()),
            admins: Arc::new(InMemoryAdminDirectory::new(admins)),
            categories: Arc::new(InMemoryCategoryRepository::with_defaults()),
            health: Arc::new(InMemoryHealth::default()),
        }
    }

    /// One active admin per role, ids 1 through 4
    pub fn with_office_admins() -> Self {
        Self::new(office_admins())
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            complaints: self.complaints.clone(),
            history: self.history.clone(),
            notifications: self.notifications.clone(),
            admins: self.admins.clone(),
            categories: self.categories.clone(),
            health: self.health.clone(),
        }
    }
}

/// A starter directory for local runs: one admin for every role
pub fn office_admins() -> Vec<AdminPrincipal> {
    AdminRole::all()
        .iter()
        .zip(1_i64..)
        .map(|(role, id)| {
            let (name, designation) = match role {
                AdminRole::UnionOffice => ("Union Officer", "Panchayat Secretary"),
                AdminRole::CollectorOffice => ("Collector Officer", "District Collector"),
                AdminRole::CmOffice => ("CM Office Officer", "Grievance Officer"),
                AdminRole::SuperAdmin => ("System Administrator", "Administrator"),
            };
            AdminPrincipal {
                id: AdminId::new(id),
                username: role.as_str().to_string(),
                name: name.to_string(),
                email: format!("{}@vcm.local", role.as_str()),
                role: *role,
                department: Some(role.to_string()),
                designation: Some(designation.to_string()),
                is_active: true,
            }
        })
        .collect()
}
