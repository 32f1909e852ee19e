//! Village Complaint Management domain types
//!
//! This crate provides the core domain model for the complaint escalation
//! workflow: complaints and their closed value sets, the status history ledger,
//! notifications, administrative principals, and categories.
//!
//! ## Architecture
//!
//! - **identifiers**: Store-assigned integer ids wrapped in newtypes
//! - **complaint**: The complaint entity, status/office/urgency enums, complaint codes
//! - **history**: Immutable ledger entries, one per transition
//! - **notification**: Notification records and message templates
//! - **admin**: Admin roles and the authority predicates over complaints
//! - **category**: Category reference data
//! - **errors**: Domain error taxonomy
//!
//! ## Usage
//!
//! ```rust
//! use vcm_domain::complaint::{ComplaintStatus, Office};
//!
//! let status: ComplaintStatus = "in_progress".parse().unwrap();
//! assert_eq!(status, ComplaintStatus::InProgress);
//!
//! assert!(Office::UnionOffice.can_forward_to(Office::CollectorOffice));
//! assert!(!Office::CmOffice.can_forward_to(Office::UnionOffice));
//! ```

#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

pub mod admin;
pub mod category;
pub mod complaint;
pub mod errors;
pub mod history;
pub mod identifiers;
pub mod notification;

// Re-export commonly used types
pub use admin::{AdminPrincipal, AdminRole};
pub use category::{default_categories, Category, DEFAULT_CATEGORIES};
pub use complaint::{
    Complaint, ComplaintCode, ComplaintStatus, ContactInfo, NewComplaint, Office, Urgency,
};
pub use errors::{DomainError, DomainResult};
pub use history::{NewHistoryEntry, StatusHistoryEntry};
pub use identifiers::*;
pub use notification::{
    NewNotification, Notification, NotificationTemplate, NotificationType, Recipient,
};
