//! Custom Axum extractors.
//!
//! Bearer identities for the three access tiers, pagination, and validated
//! JSON payloads.

pub mod auth;
pub mod pagination;
pub mod validated_json;

pub use auth::{AuthenticatedAdmin, AuthenticatedCitizen, Claims, Identity, MaybeCitizen};
pub use pagination::Pagination;
pub use validated_json::ValidatedJson;
