//! Admin endpoints: office-scoped complaint handling and the inbox.
//!
//! Every handler takes an `AuthenticatedAdmin`, so the directory is
//! consulted on each request and a revoked admin is turned away.

use super::{non_blank, parse_filter, parse_id};
use crate::{
    error::ApiResult,
    extractors::{AuthenticatedAdmin, Pagination, ValidatedJson},
    responses::{ApiResponse, PaginatedResponse},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;
use vcm_application::{
    dto::{
        AdminSummary, AssignmentReceipt, ComplaintDetail, ComplaintView, DashboardStats,
        ForwardReceipt, StatusChange,
    },
    AdminComplaintQuery,
};
use vcm_domain::{
    AdminId, ComplaintId, ComplaintStatus, Notification, NotificationId, Office,
};

/// Admin complaint list filters
#[derive(Debug, Deserialize)]
pub struct ComplaintListQuery {
    pub status: Option<String>,
    pub urgency: Option<String>,
    /// Category name
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,

    #[validate(length(max = 1000, message = "Comments cannot exceed 1000 characters"))]
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[validate(range(min = 1, message = "Invalid admin ID"))]
    pub assigned_to: i64,

    #[validate(length(max = 1000, message = "Comments cannot exceed 1000 characters"))]
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForwardRequest {
    pub target_office: String,

    #[validate(length(max = 1000, message = "Comments cannot exceed 1000 characters"))]
    pub comments: Option<String>,
}

/// Inbox filters
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default, rename = "unreadOnly", alias = "unread_only")]
    pub unread_only: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkedRead {
    pub updated: u64,
}

/// Admin routes, nested under `/admin`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/complaints", get(list_complaints))
        .route("/complaints/:id", get(get_complaint))
        .route("/complaints/:id/status", put(update_status))
        .route("/complaints/:id/assign", put(assign_complaint))
        .route("/complaints/:id/forward", put(forward_complaint))
        .route("/users", get(list_users))
        .route("/dashboard", get(dashboard))
        .route("/notifications", get(list_notifications))
        .route("/notifications/mark-all-read", put(mark_all_read))
        .route("/notifications/:id/read", put(mark_read))
}

async fn list_complaints(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Pagination(page): Pagination,
    Query(query): Query<ComplaintListQuery>,
) -> ApiResult<ApiResponse<PaginatedResponse<ComplaintView>>> {
    let query = AdminComplaintQuery {
        status: parse_filter(query.status)?,
        urgency: parse_filter(query.urgency)?,
        category: non_blank(query.category),
        search: non_blank(query.search),
    };
    let result = state.queries.list_for_admin(&admin, query, page).await?;
    Ok(ApiResponse::success(result.into()))
}

async fn get_complaint(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<ComplaintDetail>> {
    let id: ComplaintId = parse_id(&id, "complaint")?;
    let detail = state.queries.get_for_admin(&admin, id).await?;
    Ok(ApiResponse::success(detail))
}

async fn update_status(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateStatusRequest>,
) -> ApiResult<ApiResponse<StatusChange>> {
    let id: ComplaintId = parse_id(&id, "complaint")?;
    let status: ComplaintStatus = req.status.trim().parse()?;

    let committed = state
        .engine
        .update_status(&admin, id, status, non_blank(req.comments))
        .await?;
    Ok(ApiResponse::committed(
        committed,
        "Complaint status updated successfully",
    ))
}

async fn assign_complaint(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<AssignRequest>,
) -> ApiResult<ApiResponse<AssignmentReceipt>> {
    let id: ComplaintId = parse_id(&id, "complaint")?;

    let committed = state
        .engine
        .assign(
            &admin,
            id,
            AdminId::new(req.assigned_to),
            non_blank(req.comments),
        )
        .await?;
    Ok(ApiResponse::committed(
        committed,
        "Complaint assigned successfully",
    ))
}

async fn forward_complaint(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ForwardRequest>,
) -> ApiResult<ApiResponse<ForwardReceipt>> {
    let id: ComplaintId = parse_id(&id, "complaint")?;
    let target: Office = req.target_office.trim().parse()?;

    let committed = state
        .engine
        .forward(&admin, id, target, non_blank(req.comments))
        .await?;
    let message = format!("Complaint forwarded to {} successfully", target);
    Ok(ApiResponse::committed(committed, message))
}

/// Active admins the caller may assign to
async fn list_users(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
) -> ApiResult<ApiResponse<Vec<AdminSummary>>> {
    let admins = state.queries.list_assignable_admins(&admin).await?;
    Ok(ApiResponse::success(admins))
}

async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
) -> ApiResult<ApiResponse<DashboardStats>> {
    Ok(ApiResponse::success(state.queries.dashboard(&admin).await?))
}

async fn list_notifications(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Pagination(page): Pagination,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<ApiResponse<PaginatedResponse<Notification>>> {
    let result = state.inbox.list(&admin, query.unread_only, page).await?;
    Ok(ApiResponse::success(result.into()))
}

async fn mark_read(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    let id: NotificationId = parse_id(&id, "notification")?;
    state.inbox.mark_read(&admin, id).await?;
    Ok(ApiResponse::message("Notification marked as read"))
}

async fn mark_all_read(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
) -> ApiResult<ApiResponse<MarkedRead>> {
    let updated = state.inbox.mark_all_read(&admin).await?;
    Ok(ApiResponse::success_with_message(
        MarkedRead { updated },
        "All notifications marked as read",
    ))
}
