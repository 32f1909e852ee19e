//! API v1 routes.

use crate::{error::ApiError, state::AppState};
use axum::Router;
use std::str::FromStr;
use vcm_domain::DomainError;

pub mod admin;
pub mod complaints;

/// Create all v1 API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/complaints", complaints::routes())
        .nest("/admin", admin::routes())
}

/// Parse an optional closed-enum filter; blank means unset
fn parse_filter<T>(value: Option<String>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(T::from_str)
        .transpose()
        .map_err(ApiError::from)
}

/// Parse a numeric path id
fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} id '{}'", what, raw)))
}

/// Trimmed text, `None` when blank
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
