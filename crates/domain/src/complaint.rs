//! Complaint entity and its closed value sets.
//!
//! A complaint is created pending at the union office and is only ever mutated
//! through three transitions: a status change, an assignment, and a forward to
//! a higher office. Each transition method here keeps the entity's invariants;
//! persistence and auditing are the caller's concern.

use crate::errors::{DomainError, DomainResult};
use crate::identifiers::{AdminId, CategoryId, ComplaintId, UserId};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Lifecycle status of a complaint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    /// Submitted, not yet looked at
    Pending,
    /// Seen by the holding office
    Acknowledged,
    /// Being worked on
    InProgress,
    /// Closed with a fix
    Resolved,
    /// Closed without action
    Rejected,
}

impl ComplaintStatus {
    pub fn all() -> &'static [ComplaintStatus] {
        &[
            Self::Pending,
            Self::Acknowledged,
            Self::InProgress,
            Self::Resolved,
            Self::Rejected,
        ]
    }

    /// Wire and storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Acknowledged => "acknowledged",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Acknowledged => "Acknowledged",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidStatus(s.to_string()))
    }
}

/// Custodial office in the escalation hierarchy
///
/// Offices are ranked union < collector < cm. A complaint only ever moves
/// upward through the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Office {
    UnionOffice,
    CollectorOffice,
    CmOffice,
}

impl Office {
    pub fn all() -> &'static [Office] {
        &[Self::UnionOffice, Self::CollectorOffice, Self::CmOffice]
    }

    /// Position in the hierarchy, starting at 1 for the union office
    pub fn rank(&self) -> u8 {
        match self {
            Self::UnionOffice => 1,
            Self::CollectorOffice => 2,
            Self::CmOffice => 3,
        }
    }

    /// Whether a complaint held here may be forwarded to `target`
    pub fn can_forward_to(&self, target: Office) -> bool {
        target.rank() > self.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnionOffice => "union_office",
            Self::CollectorOffice => "collector_office",
            Self::CmOffice => "cm_office",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::UnionOffice => "Union Office",
            Self::CollectorOffice => "Collector Office",
            Self::CmOffice => "CM Office",
        }
    }
}

impl fmt::Display for Office {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Office {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|office| office.as_str() == s)
            .ok_or_else(|| DomainError::InvalidOffice(s.to_string()))
    }
}

/// Urgency declared by the submitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn all() -> &'static [Urgency] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|urgency| urgency.as_str() == s)
            .ok_or_else(|| DomainError::InvalidUrgency(s.to_string()))
    }
}

/// Human-facing complaint code: `VCM` + 6 timestamp digits + 3 random digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComplaintCode(String);

impl ComplaintCode {
    pub const PREFIX: &'static str = "VCM";

    /// Build a code from a millisecond timestamp and a random number.
    ///
    /// Only the last six digits of the timestamp and the last three digits of
    /// the random number are kept.
    pub fn compose(timestamp_millis: i64, random: u32) -> Self {
        let suffix = timestamp_millis.rem_euclid(1_000_000);
        let random = random % 1_000;
        Self(format!("{}{:06}{:03}", Self::PREFIX, suffix, random))
    }

    /// Parse and validate a code supplied by a caller
    pub fn parse(value: &str) -> DomainResult<Self> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| Regex::new(r"^VCM[0-9]{9}$").ok());

        let trimmed = value.trim();
        match pattern {
            Some(re) if re.is_match(trimmed) => Ok(Self(trimmed.to_string())),
            _ => Err(DomainError::InvalidComplaintCode(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComplaintCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ComplaintCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ComplaintCode> for String {
    fn from(code: ComplaintCode) -> Self {
        code.0
    }
}

/// Contact details left by a non-anonymous submitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// A complaint as persisted by the complaint store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    pub code: ComplaintCode,
    pub title: String,
    pub description: String,
    pub location: String,
    pub urgency: Urgency,
    pub category_id: CategoryId,
    /// Absent for anonymous or unauthenticated submissions
    pub submitter: Option<UserId>,
    pub contact: Option<ContactInfo>,
    pub is_anonymous: bool,
    /// Opaque evidence references, in submission order
    pub attachments: Vec<String>,
    pub status: ComplaintStatus,
    pub current_office: Office,
    pub assigned_to: Option<AdminId>,
    /// Optimistic concurrency token, bumped by the store on every update
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Complaint {
    /// Change the status, returning the previous one.
    ///
    /// `resolved_at` tracks the status: it is stamped on entering `resolved`
    /// and cleared on leaving it.
    pub fn apply_status(&mut self, status: ComplaintStatus, now: DateTime<Utc>) -> ComplaintStatus {
        let previous = self.status;
        self.status = status;
        self.resolved_at = match status {
            ComplaintStatus::Resolved => Some(now),
            _ => None,
        };
        self.updated_at = now;
        previous
    }

    /// Bind the complaint to an admin of the holding office
    pub fn assign_to(&mut self, admin: AdminId, now: DateTime<Utc>) {
        self.assigned_to = Some(admin);
        self.updated_at = now;
    }

    /// Move custody to a strictly higher office, returning the previous office.
    ///
    /// The assignee is cleared because assignment does not carry across offices.
    pub fn forward_to(&mut self, target: Office, now: DateTime<Utc>) -> DomainResult<Office> {
        let previous = self.current_office;
        if !previous.can_forward_to(target) {
            return Err(DomainError::InvalidTransition {
                from: previous,
                to: target,
            });
        }

        self.current_office = target;
        self.assigned_to = None;
        self.updated_at = now;
        Ok(previous)
    }
}

/// A complaint about to be inserted; the store assigns its id
///
/// There is no way to choose the initial status or office: every complaint
/// starts pending at the union office.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComplaint {
    pub code: ComplaintCode,
    pub title: String,
    pub description: String,
    pub location: String,
    pub urgency: Urgency,
    pub category_id: CategoryId,
    pub submitter: Option<UserId>,
    pub contact: Option<ContactInfo>,
    pub is_anonymous: bool,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl NewComplaint {
    /// Drop contact details when the submission is anonymous
    pub fn withhold_contact_if_anonymous(mut self) -> Self {
        if self.is_anonymous {
            self.contact = None;
        }
        self
    }

    /// Materialise the stored record once the store has assigned an id
    pub fn into_complaint(self, id: ComplaintId) -> Complaint {
        let draft = self.withhold_contact_if_anonymous();
        Complaint {
            id,
            code: draft.code,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            urgency: draft.urgency,
            category_id: draft.category_id,
            submitter: draft.submitter,
            contact: draft.contact,
            is_anonymous: draft.is_anonymous,
            attachments: draft.attachments,
            status: ComplaintStatus::Pending,
            current_office: Office::UnionOffice,
            assigned_to: None,
            version: 1,
            created_at: draft.created_at,
            updated_at: draft.created_at,
            resolved_at: None,
        }
    }
}
