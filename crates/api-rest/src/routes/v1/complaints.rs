//! Public and citizen complaint endpoints.

use super::{non_blank, parse_filter};
use crate::{
    error::ApiResult,
    extractors::{AuthenticatedCitizen, MaybeCitizen, Pagination, ValidatedJson},
    responses::{ApiResponse, Created, PaginatedResponse},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use validator::{Validate, ValidationError};
use vcm_application::{
    dto::{
        ComplaintDetail, ComplaintSearchItem, ComplaintStatistics, ComplaintView,
        SubmissionReceipt, SubmitComplaintInput,
    },
    PublicSearchQuery,
};
use vcm_domain::{Category, ComplaintStatus, ContactInfo, Urgency};

/// Complaint submission request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_contact", skip_on_field_errors = false))]
pub struct SubmitComplaintRequest {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: String,

    #[validate(length(
        min = 20,
        max = 2000,
        message = "Description must be between 20 and 2000 characters"
    ))]
    pub description: String,

    /// Category name
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,

    #[serde(default)]
    #[validate(length(max = 500, message = "Location cannot exceed 500 characters"))]
    pub location: String,

    /// Defaults to medium
    #[serde(default)]
    pub urgency: Option<String>,

    #[validate(length(
        min = 2,
        max = 100,
        message = "Contact name must be between 2 and 100 characters"
    ))]
    pub contact_name: Option<String>,

    pub contact_phone: Option<String>,

    #[validate(email(message = "Please provide a valid email"))]
    pub contact_email: Option<String>,

    #[serde(default)]
    pub is_anonymous: bool,

    /// Stored attachment references
    #[serde(default)]
    pub attachments: Vec<String>,
}

fn validate_contact(req: &SubmitComplaintRequest) -> Result<(), ValidationError> {
    if req.is_anonymous {
        return Ok(());
    }

    let long_enough = |value: &Option<String>, min: usize| {
        value
            .as_deref()
            .is_some_and(|v| v.trim().chars().count() >= min)
    };

    if !long_enough(&req.contact_name, 2) {
        let mut err = ValidationError::new("contact_required");
        err.message = Some("Contact name is required when not submitting anonymously".into());
        return Err(err);
    }
    if !long_enough(&req.contact_phone, 10) {
        let mut err = ValidationError::new("contact_required");
        err.message = Some("Contact phone is required when not submitting anonymously".into());
        return Err(err);
    }
    Ok(())
}

impl SubmitComplaintRequest {
    fn into_input(self) -> ApiResult<SubmitComplaintInput> {
        let urgency = parse_filter::<Urgency>(self.urgency)?.unwrap_or_default();

        let contact = match (non_blank(self.contact_name), non_blank(self.contact_phone)) {
            (Some(name), Some(phone)) => Some(ContactInfo {
                name,
                phone,
                email: non_blank(self.contact_email),
            }),
            _ => None,
        };

        Ok(SubmitComplaintInput {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            location: self.location.trim().to_string(),
            urgency,
            contact,
            is_anonymous: self.is_anonymous,
            attachments: self.attachments,
        })
    }
}

/// Citizen listing filters
#[derive(Debug, Deserialize)]
pub struct MyComplaintsQuery {
    pub status: Option<String>,
}

/// Public search filters
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Complaint routes, nested under `/complaints`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit_complaint))
        .route("/status/:code", get(get_status))
        .route("/my-complaints", get(my_complaints))
        .route("/categories", get(list_categories))
        .route("/statistics", get(statistics))
        .route("/search", get(search))
}

/// Submit a complaint, anonymously or as the signed-in citizen
async fn submit_complaint(
    State(state): State<AppState>,
    MaybeCitizen(citizen): MaybeCitizen,
    ValidatedJson(req): ValidatedJson<SubmitComplaintRequest>,
) -> ApiResult<Created<SubmissionReceipt>> {
    let committed = state.engine.submit(req.into_input()?, citizen).await?;
    Ok(Created(ApiResponse::committed(
        committed,
        "Complaint submitted successfully",
    )))
}

/// Public status lookup by complaint code
async fn get_status(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<ApiResponse<ComplaintDetail>> {
    let detail = state.queries.get_status(&code).await?;
    Ok(ApiResponse::success(detail))
}

async fn my_complaints(
    State(state): State<AppState>,
    AuthenticatedCitizen(citizen): AuthenticatedCitizen,
    Pagination(page): Pagination,
    Query(query): Query<MyComplaintsQuery>,
) -> ApiResult<ApiResponse<PaginatedResponse<ComplaintView>>> {
    let status = parse_filter::<ComplaintStatus>(query.status)?;
    let result = state
        .queries
        .list_for_citizen(citizen, status, page)
        .await?;
    Ok(ApiResponse::success(result.into()))
}

async fn list_categories(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Category>>> {
    Ok(ApiResponse::success(state.queries.categories().await?))
}

async fn statistics(State(state): State<AppState>) -> ApiResult<ApiResponse<ComplaintStatistics>> {
    Ok(ApiResponse::success(state.queries.statistics().await?))
}

async fn search(
    State(state): State<AppState>,
    Pagination(page): Pagination,
    Query(query): Query<SearchQuery>,
) -> ApiResult<ApiResponse<PaginatedResponse<ComplaintSearchItem>>> {
    let query = PublicSearchQuery {
        q: non_blank(query.q),
        category: non_blank(query.category),
        status: parse_filter(query.status)?,
    };
    let result = state.queries.search(query, page).await?;
    Ok(ApiResponse::success(result.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SubmitComplaintRequest {
        SubmitComplaintRequest {
            title: "No water in ward 4".to_string(),
            description: "The hand pump near the school has been dry for a week.".to_string(),
            category: "Water Supply Issues".to_string(),
            location: "Ward 4".to_string(),
            urgency: None,
            contact_name: Some("Lakshmi Devi".to_string()),
            contact_phone: Some("9876543210".to_string()),
            contact_email: None,
            is_anonymous: false,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_named_submission_needs_contact() {
        let mut req = request();
        req.contact_phone = None;
        assert!(req.validate().is_err());

        req.is_anonymous = true;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_short_title_is_rejected() {
        let mut req = request();
        req.title = "Leak".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_into_input_defaults_urgency_and_trims() {
        let mut req = request();
        req.title = "  No water in ward 4 ".to_string();

        let input = req.into_input().unwrap();

        assert_eq!(input.urgency, Urgency::Medium);
        assert_eq!(input.title, "No water in ward 4");
        assert_eq!(input.contact.unwrap().name, "Lakshmi Devi");
    }

    #[test]
    fn test_unknown_urgency_is_rejected() {
        let mut req = request();
        req.urgency = Some("extreme".to_string());
        assert!(req.into_input().is_err());
    }

    #[test]
    fn test_camel_case_wire_names() {
        let req: SubmitComplaintRequest = serde_json::from_value(serde_json::json!({
            "title": "Broken street light",
            "description": "The light at the bus stand has been off for ten days.",
            "category": "Electricity Problems",
            "isAnonymous": true,
            "contactName": "Ravi"
        }))
        .unwrap();

        assert!(req.is_anonymous);
        assert_eq!(req.contact_name.as_deref(), Some("Ravi"));
        assert!(req.location.is_empty());
    }
}
