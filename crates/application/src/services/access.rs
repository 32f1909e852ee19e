//! Access Guard
//!
//! Turns a verified identity assertion into a principal and decides which
//! complaints that principal may see or change.

use crate::ports::AdminDirectoryPort;
use crate::{ApplicationError, ApplicationResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};
use vcm_domain::{AdminId, AdminPrincipal, AdminRole, Complaint, UserId};

/// Identity asserted by a verified credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAssertion {
    /// User id for citizens, admin id for admins
    pub subject: i64,
    pub role: Option<AdminRole>,
    pub is_admin: bool,
}

impl IdentityAssertion {
    pub fn citizen(id: UserId) -> Self {
        Self {
            subject: id.value(),
            role: None,
            is_admin: false,
        }
    }

    pub fn admin(id: AdminId, role: AdminRole) -> Self {
        Self {
            subject: id.value(),
            role: Some(role),
            is_admin: true,
        }
    }
}

/// Resolves principals and enforces the three authorization tiers
pub struct AccessGuard {
    admins: Arc<dyn AdminDirectoryPort>,
}

impl AccessGuard {
    pub fn new(admins: Arc<dyn AdminDirectoryPort>) -> Self {
        Self { admins }
    }

    /// Resolve an admin principal, re-checking that the admin is still active.
    ///
    /// A citizen credential is `Forbidden`. An unknown, inactive or re-roled
    /// admin is `Unauthorized`.
    #[instrument(skip(self, identity), fields(subject = identity.subject))]
    pub async fn require_admin(
        &self,
        identity: &IdentityAssertion,
    ) -> ApplicationResult<AdminPrincipal> {
        if !identity.is_admin {
            return Err(ApplicationError::Forbidden(
                "Admin privileges required".to_string(),
            ));
        }

        let admin = self
            .admins
            .find(AdminId::new(identity.subject))
            .await?
            .filter(|admin| admin.is_active)
            .ok_or_else(|| {
                warn!("Rejected credential for missing or inactive admin");
                ApplicationError::Unauthorized("Admin account not found or inactive".to_string())
            })?;

        if identity.role.is_some_and(|role| role != admin.role) {
            warn!(admin_id = %admin.id, "Credential role no longer matches directory");
            return Err(ApplicationError::Unauthorized(
                "Credential role is out of date".to_string(),
            ));
        }

        Ok(admin)
    }

    /// Citizen-owned tier: only a citizen credential qualifies.
    pub fn require_citizen(&self, identity: &IdentityAssertion) -> ApplicationResult<UserId> {
        if identity.is_admin {
            return Err(ApplicationError::Forbidden(
                "Citizen account required".to_string(),
            ));
        }
        Ok(UserId::new(identity.subject))
    }

    /// Public tier with an optional citizen; admin credentials submit anonymously.
    pub fn citizen_or_anonymous(&self, identity: Option<&IdentityAssertion>) -> Option<UserId> {
        identity
            .filter(|identity| !identity.is_admin)
            .map(|identity| UserId::new(identity.subject))
    }

    /// Office-scoped tier: super admin, or the office currently holding the complaint.
    ///
    /// Failure is reported as `NotFound` so existence does not leak.
    pub fn authorize(
        &self,
        admin: &AdminPrincipal,
        complaint: &Complaint,
    ) -> ApplicationResult<()> {
        if admin.has_authority_over(complaint) {
            return Ok(());
        }
        warn!(
            admin_id = %admin.id,
            complaint_id = %complaint.id,
            office = %complaint.current_office,
            "Admin lacks authority over complaint"
        );
        Err(ApplicationError::complaint_not_found())
    }

    /// Only the holding office may forward, so super admins never can.
    pub fn authorize_forward(
        &self,
        admin: &AdminPrincipal,
        complaint: &Complaint,
    ) -> ApplicationResult<()> {
        if admin.holds(complaint) {
            return Ok(());
        }
        warn!(
            admin_id = %admin.id,
            complaint_id = %complaint.id,
            office = %complaint.current_office,
            "Forward attempted by an office that does not hold the complaint"
        );
        Err(ApplicationError::complaint_not_found())
    }
}
