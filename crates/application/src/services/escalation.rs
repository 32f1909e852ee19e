//! Office Escalation Engine
//!
//! The only writer of complaint state. Each operation checks authority and
//! input before touching the store, commits the complaint with a version
//! check, then appends the ledger entry and fans out notifications. Only the
//! complaint write can fail the operation; the rest degrade.

use super::{AccessGuard, NotificationDispatcher, Repositories, ServiceConfig};
use crate::dto::{
    AssigneeSummary, AssignmentReceipt, ForwardReceipt, StatusChange, SubmissionReceipt,
    SubmitComplaintInput,
};
use crate::outcome::{Committed, DegradedEffect, SideEffect};
use crate::ports::{
    AdminDirectoryPort, CategoryRepositoryPort, ComplaintRepositoryPort,
    StatusHistoryRepositoryPort,
};
use crate::{ApplicationError, ApplicationResult};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use vcm_common::{Clock, CodeGenerator};
use vcm_domain::{
    AdminId, AdminPrincipal, Complaint, ComplaintId, ComplaintStatus, NewComplaint,
    NewHistoryEntry, NotificationTemplate, Office, Recipient, UserId,
};

/// The complaint state machine
pub struct EscalationEngine {
    complaints: Arc<dyn ComplaintRepositoryPort>,
    history: Arc<dyn StatusHistoryRepositoryPort>,
    admins: Arc<dyn AdminDirectoryPort>,
    categories: Arc<dyn CategoryRepositoryPort>,
    guard: Arc<AccessGuard>,
    dispatcher: Arc<NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeGenerator>,
    config: ServiceConfig,
}

impl EscalationEngine {
    pub fn new(
        repositories: &Repositories,
        guard: Arc<AccessGuard>,
        dispatcher: Arc<NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        codes: Arc<dyn CodeGenerator>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            complaints: repositories.complaints.clone(),
            history: repositories.history.clone(),
            admins: repositories.admins.clone(),
            categories: repositories.categories.clone(),
            guard,
            dispatcher,
            clock,
            codes,
            config,
        }
    }

    /// Accept a new complaint at the union office.
    ///
    /// Contact details are discarded for anonymous submissions. A duplicate
    /// complaint code is retried with a fresh code up to the configured
    /// number of attempts.
    #[instrument(
        skip(self, input),
        fields(category = %input.category, anonymous = input.is_anonymous)
    )]
    pub async fn submit(
        &self,
        input: SubmitComplaintInput,
        submitter: Option<UserId>,
    ) -> ApplicationResult<Committed<SubmissionReceipt>> {
        let category = self
            .categories
            .resolve_active(&input.category)
            .await?
            .ok_or_else(|| {
                ApplicationError::InvalidCategory(format!(
                    "Unknown or inactive category '{}'",
                    input.category
                ))
            })?;

        let now = self.clock.now();
        let draft = NewComplaint {
            code: self.codes.next_code(),
            title: input.title,
            description: input.description,
            location: input.location,
            urgency: input.urgency,
            category_id: category.id,
            submitter,
            contact: input.contact,
            is_anonymous: input.is_anonymous,
            attachments: input.attachments,
            created_at: now,
        }
        .withhold_contact_if_anonymous();

        let complaint = self.insert_with_fresh_codes(draft).await?;
        info!(
            complaint_id = %complaint.id,
            complaint_code = %complaint.code,
            "Complaint submitted"
        );

        let mut committed = Committed::new(SubmissionReceipt {
            id: complaint.id,
            complaint_code: complaint.code.clone(),
            status: complaint.status,
            submitted_at: complaint.created_at,
        });

        self.record(
            NewHistoryEntry::created(complaint.id, now),
            &mut committed.degraded,
        )
        .await;

        let template = NotificationTemplate::submitted(&complaint.title, &complaint.code);
        if let Err(degraded) = self
            .dispatcher
            .notify_office(Office::UnionOffice, &template, complaint.id, now)
            .await
        {
            committed.record(degraded);
        }

        Ok(committed)
    }

    /// Set a new status on a complaint the admin has authority over.
    #[instrument(
        skip(self, admin, comment),
        fields(admin_id = %admin.id, complaint_id = %id, status = %new_status)
    )]
    pub async fn update_status(
        &self,
        admin: &AdminPrincipal,
        id: ComplaintId,
        new_status: ComplaintStatus,
        comment: Option<String>,
    ) -> ApplicationResult<Committed<StatusChange>> {
        let mut complaint = self.load_with_authority(admin, id).await?;

        let now = self.clock.now();
        let old_status = complaint.apply_status(new_status, now);
        let complaint = self.complaints.update(&complaint).await?;
        info!(old_status = %old_status, "Complaint status updated");

        let mut committed = Committed::new(StatusChange {
            old_status,
            new_status,
            updated_at: now,
        });

        self.record(
            NewHistoryEntry::status_changed(
                complaint.id,
                old_status,
                new_status,
                comment,
                admin.id,
                now,
            ),
            &mut committed.degraded,
        )
        .await;

        if let Some(submitter) = complaint.submitter {
            let template = NotificationTemplate::status_changed(&complaint.title, new_status);
            if let Err(degraded) = self
                .dispatcher
                .notify(Recipient::Citizen(submitter), &template, complaint.id, now)
                .await
            {
                committed.record(degraded);
            }
        }

        Ok(committed)
    }

    /// Bind a complaint to an active admin of its current office.
    #[instrument(
        skip(self, admin, comment),
        fields(admin_id = %admin.id, complaint_id = %id, assignee_id = %assignee_id)
    )]
    pub async fn assign(
        &self,
        admin: &AdminPrincipal,
        id: ComplaintId,
        assignee_id: AdminId,
        comment: Option<String>,
    ) -> ApplicationResult<Committed<AssignmentReceipt>> {
        let mut complaint = self.load_with_authority(admin, id).await?;

        let assignee = self
            .admins
            .find(assignee_id)
            .await?
            .filter(|candidate| candidate.can_be_assigned(&complaint))
            .ok_or_else(|| {
                warn!("Assignee missing, inactive or outside the holding office");
                ApplicationError::InvalidAssignee(format!(
                    "Admin {} is not an active member of {}",
                    assignee_id, complaint.current_office
                ))
            })?;

        let now = self.clock.now();
        complaint.assign_to(assignee.id, now);
        let complaint = self.complaints.update(&complaint).await?;
        info!(assignee = %assignee.name, "Complaint assigned");

        let mut committed = Committed::new(AssignmentReceipt {
            assigned_to: AssigneeSummary {
                id: assignee.id,
                name: assignee.name.clone(),
                role: assignee.role,
            },
            assigned_at: now,
        });

        self.record(
            NewHistoryEntry::assigned(
                complaint.id,
                complaint.status,
                &assignee.name,
                comment.as_deref(),
                admin.id,
                now,
            ),
            &mut committed.degraded,
        )
        .await;

        let template = NotificationTemplate::assigned(&complaint.title, &complaint.code);
        if let Err(degraded) = self
            .dispatcher
            .notify(Recipient::Admin(assignee.id), &template, complaint.id, now)
            .await
        {
            committed.record(degraded);
        }

        Ok(committed)
    }

    /// Hand a complaint up to a strictly higher office.
    ///
    /// Only the holding office may forward. The assignee is cleared.
    #[instrument(
        skip(self, admin, comment),
        fields(admin_id = %admin.id, complaint_id = %id, target = %target)
    )]
    pub async fn forward(
        &self,
        admin: &AdminPrincipal,
        id: ComplaintId,
        target: Office,
        comment: Option<String>,
    ) -> ApplicationResult<Committed<ForwardReceipt>> {
        let mut complaint = self.find(id).await?;
        self.guard.authorize_forward(admin, &complaint)?;

        let now = self.clock.now();
        let from = complaint.forward_to(target, now)?;
        let complaint = self.complaints.update(&complaint).await?;
        info!(from = %from, "Complaint forwarded");

        let mut committed = Committed::new(ForwardReceipt {
            target_office: target,
            forwarded_at: now,
        });

        self.record(
            NewHistoryEntry::forwarded(
                complaint.id,
                complaint.status,
                target,
                comment.as_deref(),
                admin.id,
                now,
            ),
            &mut committed.degraded,
        )
        .await;

        let template = NotificationTemplate::forwarded(&complaint.title, &complaint.code);
        if let Err(degraded) = self
            .dispatcher
            .notify_office(target, &template, complaint.id, now)
            .await
        {
            committed.record(degraded);
        }

        Ok(committed)
    }

    async fn find(&self, id: ComplaintId) -> ApplicationResult<Complaint> {
        self.complaints
            .find_by_id(id)
            .await?
            .ok_or_else(ApplicationError::complaint_not_found)
    }

    async fn load_with_authority(
        &self,
        admin: &AdminPrincipal,
        id: ComplaintId,
    ) -> ApplicationResult<Complaint> {
        let complaint = self.find(id).await?;
        self.guard.authorize(admin, &complaint)?;
        Ok(complaint)
    }

    async fn insert_with_fresh_codes(
        &self,
        mut draft: NewComplaint,
    ) -> ApplicationResult<Complaint> {
        let attempts = self.config.code_attempts.max(1);
        for attempt in 1..=attempts {
            match self.complaints.insert(draft.clone()).await {
                Ok(complaint) => return Ok(complaint),
                Err(ApplicationError::Conflict(reason)) => {
                    warn!(attempt, code = %draft.code, %reason, "Complaint code collision");
                    draft.code = self.codes.next_code();
                }
                Err(err) => return Err(err),
            }
        }

        Err(ApplicationError::Conflict(format!(
            "Could not allocate a unique complaint code after {} attempts",
            attempts
        )))
    }

    async fn record(&self, entry: NewHistoryEntry, degraded: &mut Vec<DegradedEffect>) {
        let complaint_id = entry.complaint_id;
        if let Err(err) = self.history.append(entry).await {
            warn!(complaint_id = %complaint_id, error = %err, "Status history entry not recorded");
            degraded.push(DegradedEffect::new(SideEffect::Ledger, err.to_string()));
        }
    }
}
