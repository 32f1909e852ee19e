//! Administrative principals and their authority over complaints.

use crate::complaint::{Complaint, Office};
use crate::errors::DomainError;
use crate::identifiers::AdminId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role held by an administrative user
///
/// The three office roles mirror [`Office`]. `SuperAdmin` sees every complaint
/// but never holds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    UnionOffice,
    CollectorOffice,
    CmOffice,
    SuperAdmin,
}

impl AdminRole {
    pub fn all() -> &'static [AdminRole] {
        &[
            Self::UnionOffice,
            Self::CollectorOffice,
            Self::CmOffice,
            Self::SuperAdmin,
        ]
    }

    /// The office this role staffs, if any
    pub fn office(&self) -> Option<Office> {
        match self {
            Self::UnionOffice => Some(Office::UnionOffice),
            Self::CollectorOffice => Some(Office::CollectorOffice),
            Self::CmOffice => Some(Office::CmOffice),
            Self::SuperAdmin => None,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnionOffice => "union_office",
            Self::CollectorOffice => "collector_office",
            Self::CmOffice => "cm_office",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl From<Office> for AdminRole {
    fn from(office: Office) -> Self {
        match office {
            Office::UnionOffice => Self::UnionOffice,
            Office::CollectorOffice => Self::CollectorOffice,
            Office::CmOffice => Self::CmOffice,
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| DomainError::InvalidRole(s.to_string()))
    }
}

/// An administrative user as known to the admin directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPrincipal {
    pub id: AdminId,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub is_active: bool,
}

impl AdminPrincipal {
    /// Whether this admin may view, update, or assign the complaint.
    ///
    /// Super admins hold authority everywhere; office admins only over
    /// complaints their office currently holds.
    pub fn has_authority_over(&self, complaint: &Complaint) -> bool {
        self.role.is_super_admin() || self.holds(complaint)
    }

    /// Whether this admin's office is the complaint's current custodian.
    ///
    /// Only the holding office may forward a complaint.
    pub fn holds(&self, complaint: &Complaint) -> bool {
        self.role.office() == Some(complaint.current_office)
    }

    /// Whether this admin may be made the assignee of the complaint
    pub fn can_be_assigned(&self, complaint: &Complaint) -> bool {
        self.is_active && self.holds(complaint)
    }

    /// Office filter applied to listings: `None` means every office
    pub fn visible_office(&self) -> Option<Office> {
        self.role.office()
    }
}
