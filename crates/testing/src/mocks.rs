//! Port doubles for exercising failure paths.
//!
//! Each double wraps or replaces one store so a test can make a secondary
//! write fail, lose an optimistic race, or draw complaint codes from a script.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vcm_application::ports::{
    ComplaintFilter, ComplaintRepositoryPort, ComplaintTally, NotificationRepositoryPort,
    StatusHistoryRepositoryPort,
};
use vcm_application::{ApplicationError, ApplicationResult};
use vcm_common::{CodeGenerator, PaginationParams};
use vcm_domain::{
    Complaint, ComplaintCode, ComplaintId, NewComplaint, NewHistoryEntry, NewNotification,
    Notification, NotificationId, Office, Recipient, StatusHistoryEntry,
};
use vcm_infrastructure::{InMemoryComplaintRepository, InMemoryNotificationRepository};

/// Ledger whose appends always fail
#[derive(Debug, Default)]
pub struct FailingHistoryRepository {
    attempts: AtomicUsize,
}

impl FailingHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusHistoryRepositoryPort for FailingHistoryRepository {
    async fn append(&self, _entry: NewHistoryEntry) -> ApplicationResult<StatusHistoryEntry> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ApplicationError::Storage("ledger unavailable".to_string()))
    }

    async fn list_for_complaint(
        &self,
        _complaint_id: ComplaintId,
    ) -> ApplicationResult<Vec<StatusHistoryEntry>> {
        Ok(Vec::new())
    }
}

/// Notification store that rejects inserts for chosen recipients
pub struct FailingNotificationRepository {
    inner: Arc<InMemoryNotificationRepository>,
    failing: Option<HashSet<Recipient>>,
}

impl FailingNotificationRepository {
    /// Every insert fails
    pub fn always() -> Self {
        Self {
            inner: Arc::new(InMemoryNotificationRepository::new()),
            failing: None,
        }
    }

    /// Inserts for `recipients` fail; the rest land in `inner`
    pub fn for_recipients(
        inner: Arc<InMemoryNotificationRepository>,
        recipients: impl IntoIterator<Item = Recipient>,
    ) -> Self {
        Self {
            inner,
            failing: Some(recipients.into_iter().collect()),
        }
    }

    fn fails_for(&self, recipient: &Recipient) -> bool {
        self.failing
            .as_ref()
            .map_or(true, |failing| failing.contains(recipient))
    }
}

#[async_trait]
impl NotificationRepositoryPort for FailingNotificationRepository {
    async fn insert(&self, notification: NewNotification) -> ApplicationResult<Notification> {
        if self.fails_for(&notification.recipient) {
            return Err(ApplicationError::Storage(
                "notification store unavailable".to_string(),
            ));
        }
        self.inner.insert(notification).await
    }

    async fn list_for_recipient(
        &self,
        recipient: Recipient,
        unread_only: bool,
        page: &PaginationParams,
    ) -> ApplicationResult<(Vec<Notification>, u64)> {
        self.inner
            .list_for_recipient(recipient, unread_only, page)
            .await
    }

    async fn mark_read(&self, recipient: Recipient, id: NotificationId) -> ApplicationResult<bool> {
        self.inner.mark_read(recipient, id).await
    }

    async fn mark_all_read(&self, recipient: Recipient) -> ApplicationResult<u64> {
        self.inner.mark_all_read(recipient).await
    }
}

/// Complaint store where another writer slips in before the next updates
///
/// Each armed race bumps the stored version just before the caller's
/// update, so the caller's compare-and-set fails with `Conflict`.
pub struct RacingComplaintRepository {
    inner: Arc<InMemoryComplaintRepository>,
    races: AtomicUsize,
}

impl RacingComplaintRepository {
    pub fn new(inner: Arc<InMemoryComplaintRepository>) -> Self {
        Self {
            inner,
            races: AtomicUsize::new(0),
        }
    }

    /// Lose the next `count` updates
    pub fn arm(&self, count: usize) {
        self.races.store(count, Ordering::SeqCst);
    }

    fn take_race(&self) -> bool {
        self.races
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ComplaintRepositoryPort for RacingComplaintRepository {
    async fn insert(&self, complaint: NewComplaint) -> ApplicationResult<Complaint> {
        self.inner.insert(complaint).await
    }

    async fn find_by_id(&self, id: ComplaintId) -> ApplicationResult<Option<Complaint>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_code(&self, code: &ComplaintCode) -> ApplicationResult<Option<Complaint>> {
        self.inner.find_by_code(code).await
    }

    async fn update(&self, complaint: &Complaint) -> ApplicationResult<Complaint> {
        if self.take_race() {
            if let Some(current) = self.inner.find_by_id(complaint.id).await? {
                self.inner.update(&current).await?;
            }
        }
        self.inner.update(complaint).await
    }

    async fn list(
        &self,
        filter: &ComplaintFilter,
        page: &PaginationParams,
    ) -> ApplicationResult<(Vec<Complaint>, u64)> {
        self.inner.list(filter, page).await
    }

    async fn tally(
        &self,
        office: Option<Office>,
        created_since: DateTime<Utc>,
    ) -> ApplicationResult<ComplaintTally> {
        self.inner.tally(office, created_since).await
    }
}

/// Hands out a fixed sequence of codes, then numbered fallbacks
#[derive(Debug)]
pub struct ScriptedCodeGenerator {
    script: Mutex<VecDeque<ComplaintCode>>,
    issued: AtomicUsize,
}

impl ScriptedCodeGenerator {
    pub fn new(codes: impl IntoIterator<Item = ComplaintCode>) -> Self {
        Self {
            script: Mutex::new(codes.into_iter().collect()),
            issued: AtomicUsize::new(0),
        }
    }

    /// `code` issued `times` times before the fallbacks start
    pub fn repeating(code: ComplaintCode, times: usize) -> Self {
        Self::new(std::iter::repeat(code).take(times))
    }

    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

impl CodeGenerator for ScriptedCodeGenerator {
    fn next_code(&self) -> ComplaintCode {
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| ComplaintCode::compose(999_000_000 + n as i64, (n % 1000) as u32))
    }
}
