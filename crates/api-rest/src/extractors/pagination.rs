//! Pagination extractor.

use crate::{error::ApiError, state::AppState};
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use vcm_common::PaginationParams;

/// Query parameters for pagination
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    /// Page number (1-indexed)
    #[serde(default)]
    pub page: Option<u32>,

    /// Items per page; `limit` is accepted as well
    #[serde(default, alias = "limit")]
    pub per_page: Option<u32>,
}

/// Requested page, `None` when the caller asked for nothing in particular.
///
/// Oversized pages are clamped by the services rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination(pub Option<PaginationParams>);

#[async_trait]
impl FromRequestParts<AppState> for Pagination {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PaginationQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid pagination parameters: {}", e)))?;

        if query.page == Some(0) {
            return Err(ApiError::BadRequest(
                "Page number must be greater than 0".to_string(),
            ));
        }

        let params = match (query.page, query.per_page) {
            (None, None) => None,
            (page, per_page) => Some(PaginationParams::new(
                page.unwrap_or(1),
                per_page.unwrap_or(state.config.workflow.default_page_size),
            )),
        };

        Ok(Self(params))
    }
}
