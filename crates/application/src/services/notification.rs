//! Notification Dispatcher and recipient self-service
//!
//! Dispatch is fan-out only: one record per recipient, no delivery tracking
//! and no retry. Failures come back as a degraded effect for the caller to
//! carry; they never fail the transition that triggered them.

use crate::outcome::{DegradedEffect, SideEffect};
use crate::ports::{AdminDirectoryPort, NotificationRepositoryPort};
use crate::services::ServiceConfig;
use crate::{ApplicationError, ApplicationResult};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use vcm_common::{PaginatedResult, PaginationParams};
use vcm_domain::{
    AdminPrincipal, AdminRole, ComplaintId, Notification, NotificationId, NotificationTemplate,
    Office, Recipient,
};

/// Creates notification records for a transition
pub struct NotificationDispatcher {
    notifications: Arc<dyn NotificationRepositoryPort>,
    admins: Arc<dyn AdminDirectoryPort>,
}

impl NotificationDispatcher {
    pub fn new(
        notifications: Arc<dyn NotificationRepositoryPort>,
        admins: Arc<dyn AdminDirectoryPort>,
    ) -> Self {
        Self {
            notifications,
            admins,
        }
    }

    /// Notify every active admin of `office`.
    ///
    /// Returns how many notifications were stored.
    #[instrument(skip(self, template), fields(office = %office, complaint_id = %complaint_id))]
    pub async fn notify_office(
        &self,
        office: Office,
        template: &NotificationTemplate,
        complaint_id: ComplaintId,
        at: DateTime<Utc>,
    ) -> Result<usize, DegradedEffect> {
        let recipients = self
            .admins
            .list_active(Some(AdminRole::from(office)))
            .await
            .map_err(|err| {
                warn!(error = %err, "Could not resolve office recipients");
                DegradedEffect::new(SideEffect::Notification, err.to_string())
            })?
            .into_iter()
            .map(|admin| Recipient::Admin(admin.id))
            .collect();

        self.deliver(recipients, template, complaint_id, at).await
    }

    /// Notify a single recipient
    pub async fn notify(
        &self,
        recipient: Recipient,
        template: &NotificationTemplate,
        complaint_id: ComplaintId,
        at: DateTime<Utc>,
    ) -> Result<usize, DegradedEffect> {
        self.deliver(vec![recipient], template, complaint_id, at)
            .await
    }

    async fn deliver(
        &self,
        recipients: Vec<Recipient>,
        template: &NotificationTemplate,
        complaint_id: ComplaintId,
        at: DateTime<Utc>,
    ) -> Result<usize, DegradedEffect> {
        let attempted = recipients.len();
        let inserts = recipients.into_iter().map(|recipient| {
            self.notifications
                .insert(template.addressed_to(recipient, complaint_id, at))
        });

        let failures: Vec<ApplicationError> = join_all(inserts)
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect();

        if let Some(first) = failures.first() {
            warn!(
                failed = failures.len(),
                attempted,
                error = %first,
                kind = %template.kind,
                "Notification fan-out incomplete"
            );
            return Err(DegradedEffect::new(
                SideEffect::Notification,
                format!(
                    "{} of {} notifications failed: {}",
                    failures.len(),
                    attempted,
                    first
                ),
            ));
        }

        debug!(delivered = attempted, kind = %template.kind, "Notifications stored");
        Ok(attempted)
    }
}

/// Admin-facing notification inbox
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepositoryPort>,
    config: ServiceConfig,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationRepositoryPort>, config: ServiceConfig) -> Self {
        Self {
            notifications,
            config,
        }
    }

    /// The admin's notifications, newest first
    #[instrument(skip(self, admin), fields(admin_id = %admin.id))]
    pub async fn list(
        &self,
        admin: &AdminPrincipal,
        unread_only: bool,
        page: Option<PaginationParams>,
    ) -> ApplicationResult<PaginatedResult<Notification>> {
        let page = self.config.page(page);
        let (items, total) = self
            .notifications
            .list_for_recipient(Recipient::Admin(admin.id), unread_only, &page)
            .await?;
        Ok(PaginatedResult::from_params(items, &page, total))
    }

    /// Mark one of the admin's own notifications read
    #[instrument(skip(self, admin), fields(admin_id = %admin.id))]
    pub async fn mark_read(
        &self,
        admin: &AdminPrincipal,
        id: NotificationId,
    ) -> ApplicationResult<()> {
        if self
            .notifications
            .mark_read(Recipient::Admin(admin.id), id)
            .await?
        {
            Ok(())
        } else {
            Err(ApplicationError::NotFound(format!(
                "Notification {} not found",
                id
            )))
        }
    }

    /// Mark everything in the admin's inbox read
    #[instrument(skip(self, admin), fields(admin_id = %admin.id))]
    pub async fn mark_all_read(&self, admin: &AdminPrincipal) -> ApplicationResult<u64> {
        let changed = self
            .notifications
            .mark_all_read(Recipient::Admin(admin.id))
            .await?;
        info!(changed, "Notifications marked read");
        Ok(changed)
    }
}
