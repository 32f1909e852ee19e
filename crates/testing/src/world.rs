//! The full service graph wired over in-memory stores.

use chrono::Duration;
use std::sync::Arc;
use vcm_application::dto::{SubmissionReceipt, SubmitComplaintInput};
use vcm_application::ports::{
    ComplaintRepositoryPort, NotificationRepositoryPort, StatusHistoryRepositoryPort,
};
use vcm_application::{
    AccessGuard, ApplicationResult, Committed, ComplaintQueryService, EscalationEngine,
    IdentityAssertion, NotificationDispatcher, NotificationService, Repositories, ServiceConfig,
};
use vcm_common::{CodeGenerator, FixedClock, TimestampCodeGenerator};
use vcm_domain::{
    AdminPrincipal, AdminRole, Complaint, ComplaintId, Notification, Recipient,
    StatusHistoryEntry, UserId,
};
use vcm_infrastructure::InMemoryStores;

use crate::builders::SubmissionBuilder;
use crate::fixtures::{create_test_directory, test_epoch};

/// Services, stores and clock for one test
pub struct TestWorld {
    pub stores: InMemoryStores,
    pub repositories: Repositories,
    pub clock: Arc<FixedClock>,
    pub guard: Arc<AccessGuard>,
    pub engine: EscalationEngine,
    pub queries: ComplaintQueryService,
    pub inbox: NotificationService,
}

impl TestWorld {
    /// Default world: the fake directory from [`create_test_directory`]
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TestWorldBuilder {
        TestWorldBuilder::default()
    }

    /// First active admin holding `role`
    pub fn admin(&self, role: AdminRole) -> AdminPrincipal {
        self.admins(role).remove(0)
    }

    /// Every seeded admin holding `role`, in id order
    pub fn admins(&self, role: AdminRole) -> Vec<AdminPrincipal> {
        let mut admins: Vec<AdminPrincipal> = self
            .stores
            .admins
            .snapshot()
            .into_iter()
            .filter(|a| a.role == role && a.is_active)
            .collect();
        admins.sort_by_key(|a| a.id);
        assert!(!admins.is_empty(), "no active {role} admin seeded");
        admins
    }

    /// Identity a verified admin credential would assert
    pub fn identity_of(&self, admin: &AdminPrincipal) -> IdentityAssertion {
        IdentityAssertion::admin(admin.id, admin.role)
    }

    /// Submit the default complaint input
    pub async fn submit(&self, citizen: Option<UserId>) -> SubmissionReceipt {
        self.submit_input(SubmissionBuilder::new().build(), citizen)
            .await
            .expect("submission should succeed")
            .value
    }

    pub async fn submit_input(
        &self,
        input: SubmitComplaintInput,
        citizen: Option<UserId>,
    ) -> ApplicationResult<Committed<SubmissionReceipt>> {
        self.engine.submit(input, citizen).await
    }

    /// Stored record, bypassing authorization
    pub async fn complaint(&self, id: ComplaintId) -> Complaint {
        self.repositories
            .complaints
            .find_by_id(id)
            .await
            .expect("store read")
            .expect("complaint exists")
    }

    pub async fn history(&self, id: ComplaintId) -> Vec<StatusHistoryEntry> {
        self.repositories
            .history
            .list_for_complaint(id)
            .await
            .expect("ledger read")
    }

    /// Notifications addressed to `recipient`, oldest first
    pub fn notifications_for(&self, recipient: Recipient) -> Vec<Notification> {
        self.stores.notifications.addressed_to(recipient)
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Overrides for individual ports and settings
pub struct TestWorldBuilder {
    admins: Vec<AdminPrincipal>,
    complaints: Option<Arc<dyn ComplaintRepositoryPort>>,
    history: Option<Arc<dyn StatusHistoryRepositoryPort>>,
    notifications: Option<Arc<dyn NotificationRepositoryPort>>,
    codes: Option<Arc<dyn CodeGenerator>>,
    config: ServiceConfig,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self {
            admins: create_test_directory(),
            complaints: None,
            history: None,
            notifications: None,
            codes: None,
            config: ServiceConfig::default(),
        }
    }
}

impl TestWorldBuilder {
    pub fn with_admins(mut self, admins: Vec<AdminPrincipal>) -> Self {
        self.admins = admins;
        self
    }

    pub fn with_complaints(mut self, complaints: Arc<dyn ComplaintRepositoryPort>) -> Self {
        self.complaints = Some(complaints);
        self
    }

    pub fn with_history(mut self, history: Arc<dyn StatusHistoryRepositoryPort>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_notifications(
        mut self,
        notifications: Arc<dyn NotificationRepositoryPort>,
    ) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn with_codes(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = Some(codes);
        self
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TestWorld {
        let stores = InMemoryStores::new(self.admins);
        let mut repositories = stores.repositories();
        if let Some(complaints) = self.complaints {
            repositories.complaints = complaints;
        }
        if let Some(history) = self.history {
            repositories.history = history;
        }
        if let Some(notifications) = self.notifications {
            repositories.notifications = notifications;
        }

        let clock = Arc::new(FixedClock::new(test_epoch()));
        let codes: Arc<dyn CodeGenerator> = match self.codes {
            Some(codes) => codes,
            None => Arc::new(TimestampCodeGenerator::seeded(clock.clone(), 7)),
        };

        let guard = Arc::new(AccessGuard::new(repositories.admins.clone()));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            repositories.notifications.clone(),
            repositories.admins.clone(),
        ));
        let engine = EscalationEngine::new(
            &repositories,
            guard.clone(),
            dispatcher,
            clock.clone(),
            codes,
            self.config,
        );
        let queries =
            ComplaintQueryService::new(&repositories, guard.clone(), clock.clone(), self.config);
        let inbox = NotificationService::new(repositories.notifications.clone(), self.config);

        TestWorld {
            stores,
            repositories,
            clock,
            guard,
            engine,
            queries,
            inbox,
        }
    }
}
