//! Standardized API response types.
//!
//! Every success body is `{ success, data, message }`. Mutations whose
//! secondary effects degraded add a `warnings` list but keep their success
//! status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use vcm_application::Committed;
use vcm_common::PaginatedResult;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,

    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Secondary effects that did not complete
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            warnings: Vec::new(),
        }
    }

    /// Create a success response with data and message
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }

    /// A committed mutation, carrying a warning per degraded effect
    pub fn committed(committed: Committed<T>, message: impl Into<String>) -> Self {
        let warnings = committed.warnings();
        Self {
            warnings,
            ..Self::success_with_message(committed.value, message)
        }
    }
}

impl ApiResponse<()> {
    /// Create a response with just a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            warnings: Vec::new(),
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Paginated payload placed under `data`
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Items for the current page
    pub items: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: u32,

    /// Items per page
    pub per_page: u32,

    /// Total number of items
    pub total: u64,

    /// Total number of pages
    pub total_pages: u32,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl<T> From<PaginatedResult<T>> for PaginatedResponse<T> {
    fn from(result: PaginatedResult<T>) -> Self {
        Self {
            items: result.items,
            pagination: PaginationMeta {
                page: result.page,
                per_page: result.per_page,
                total: result.total,
                total_pages: result.total_pages,
                has_next: result.has_next,
                has_prev: result.has_prev,
            },
        }
    }
}

/// Created response (HTTP 201)
pub struct Created<T>(pub ApiResponse<T>);

impl<T> IntoResponse for Created<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcm_application::{DegradedEffect, SideEffect};

    #[test]
    fn test_complete_commit_has_no_warnings() {
        let response = ApiResponse::committed(Committed::new(7), "Done");
        let body = serde_json::to_value(&response).unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["data"], 7);
        assert_eq!(body["message"], "Done");
        assert!(body.get("warnings").is_none());
    }

    #[test]
    fn test_degraded_commit_lists_warnings() {
        let mut committed = Committed::new("ok");
        committed.record(DegradedEffect::new(SideEffect::Ledger, "disk full"));

        let body = serde_json::to_value(ApiResponse::committed(committed, "Done")).unwrap();

        assert_eq!(
            body["warnings"],
            serde_json::json!(["status history was not recorded: disk full"])
        );
    }

    #[test]
    fn test_pagination_meta_is_carried() {
        let page = PaginatedResult::new(vec![1, 2], 2, 2, 5);
        let response: PaginatedResponse<i32> = page.into();

        assert_eq!(response.items, vec![1, 2]);
        assert_eq!(response.pagination.total_pages, 3);
        assert!(response.pagination.has_next);
        assert!(response.pagination.has_prev);
    }
}
