//! Tests for the read paths
//!
//! Public lookup and search, citizen listings, office-scoped admin views,
//! statistics and the notification inbox.

use chrono::Duration;
use vcm_application::dto::DESCRIPTION_PREVIEW_CHARS;
use vcm_application::{AdminComplaintQuery, ApplicationError, IdentityAssertion, PublicSearchQuery};
use vcm_common::PaginationParams;
use vcm_domain::{
    AdminRole, ComplaintStatus, NotificationId, Office, Urgency, UserId, DEFAULT_CATEGORIES,
};
use vcm_testing::{SubmissionBuilder, TestWorld};

#[tokio::test]
async fn test_public_status_is_redacted_with_history() {
    // Arrange
    let world = TestWorld::new();
    let receipt = world.submit(Some(UserId::new(5))).await;
    let union = world.admin(AdminRole::UnionOffice);
    world
        .engine
        .update_status(&union, receipt.id, ComplaintStatus::Acknowledged, None)
        .await
        .unwrap();

    // Act
    let detail = world
        .queries
        .get_status(receipt.complaint_code.as_str())
        .await
        .unwrap();

    // Assert
    assert_eq!(detail.complaint.contact, None);
    assert_eq!(detail.complaint.submitter, None);
    assert_eq!(detail.complaint.category_name.as_deref(), Some("Water Supply Issues"));
    assert_eq!(detail.status_history.len(), 2);
    assert_eq!(detail.status_history[0].changed_by_name, None);
    assert_eq!(
        detail.status_history[1].changed_by_name.as_deref(),
        Some(union.name.as_str())
    );
}

#[tokio::test]
async fn test_status_lookup_of_unknown_or_malformed_code() {
    let world = TestWorld::new();

    for code in ["VCM000000000", "not-a-code", ""] {
        let err = world.queries.get_status(code).await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)), "code {code:?}");
    }
}

#[tokio::test]
async fn test_admin_detail_keeps_contact() {
    let world = TestWorld::new();
    let receipt = world.submit(Some(UserId::new(5))).await;
    let union = world.admin(AdminRole::UnionOffice);
    let cm = world.admin(AdminRole::CmOffice);

    let detail = world.queries.get_for_admin(&union, receipt.id).await.unwrap();
    assert!(detail.complaint.contact.is_some());

    let hidden = world.queries.get_for_admin(&cm, receipt.id).await.unwrap_err();
    assert_eq!(hidden, ApplicationError::complaint_not_found());
}

#[tokio::test]
async fn test_admin_listing_is_scoped_to_office() {
    // Arrange
    let world = TestWorld::new();
    let union = world.admin(AdminRole::UnionOffice);
    let collector = world.admin(AdminRole::CollectorOffice);
    let super_admin = world.admin(AdminRole::SuperAdmin);

    let stays = world.submit(None).await;
    let moves = world.submit(None).await;
    world
        .engine
        .forward(&union, moves.id, Office::CollectorOffice, None)
        .await
        .unwrap();

    // Act
    let union_view = world
        .queries
        .list_for_admin(&union, AdminComplaintQuery::default(), None)
        .await
        .unwrap();
    let collector_view = world
        .queries
        .list_for_admin(&collector, AdminComplaintQuery::default(), None)
        .await
        .unwrap();
    let everything = world
        .queries
        .list_for_admin(&super_admin, AdminComplaintQuery::default(), None)
        .await
        .unwrap();

    // Assert
    assert_eq!(union_view.total, 1);
    assert_eq!(union_view.items[0].id, stays.id);
    assert_eq!(collector_view.total, 1);
    assert_eq!(collector_view.items[0].id, moves.id);
    assert_eq!(everything.total, 2);
}

#[tokio::test]
async fn test_admin_listing_filters() {
    let world = TestWorld::new();
    let union = world.admin(AdminRole::UnionOffice);

    world
        .submit_input(
            SubmissionBuilder::new()
                .with_category("Electricity Problems")
                .with_urgency(Urgency::Critical)
                .with_title("Transformer sparking")
                .build(),
            None,
        )
        .await
        .unwrap();
    world.submit(None).await;

    let by_category = world
        .queries
        .list_for_admin(
            &union,
            AdminComplaintQuery {
                category: Some("Electricity Problems".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_category.total, 1);
    assert_eq!(by_category.items[0].title, "Transformer sparking");

    let by_urgency = world
        .queries
        .list_for_admin(
            &union,
            AdminComplaintQuery {
                urgency: Some(Urgency::Medium),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_urgency.total, 1);

    let by_search = world
        .queries
        .list_for_admin(
            &union,
            AdminComplaintQuery {
                search: Some("TRANSFORMER".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_search.total, 1);

    let unknown_category = world
        .queries
        .list_for_admin(
            &union,
            AdminComplaintQuery {
                category: Some("Street Dogs".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(unknown_category.total, 0);
    assert!(unknown_category.items.is_empty());
}

#[tokio::test]
async fn test_listing_is_newest_first_and_paginated() {
    let world = TestWorld::new();
    let union = world.admin(AdminRole::UnionOffice);
    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(world.submit(None).await.id);
        world.advance(Duration::minutes(1));
    }

    let page = world
        .queries
        .list_for_admin(
            &union,
            AdminComplaintQuery::default(),
            Some(PaginationParams::new(2, 2)),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next);
    assert!(page.has_prev);
    assert_eq!(page.items[0].id, ids[2]);
    assert_eq!(page.items[1].id, ids[1]);
}

#[tokio::test]
async fn test_oversized_page_is_capped() {
    let world = TestWorld::new();
    world.submit(None).await;

    let page = world
        .queries
        .search(PublicSearchQuery::default(), Some(PaginationParams::new(1, 10_000)))
        .await
        .unwrap();

    assert_eq!(page.per_page, 100);
}

#[tokio::test]
async fn test_citizen_sees_only_own_complaints() {
    let world = TestWorld::new();
    let mine = UserId::new(100);
    let theirs = UserId::new(200);
    let own = world.submit(Some(mine)).await;
    world.submit(Some(theirs)).await;
    world.submit(None).await;

    let listed = world.queries.list_for_citizen(mine, None, None).await.unwrap();

    assert_eq!(listed.total, 1);
    assert_eq!(listed.items[0].id, own.id);

    let resolved_only = world
        .queries
        .list_for_citizen(mine, Some(ComplaintStatus::Resolved), None)
        .await
        .unwrap();
    assert_eq!(resolved_only.total, 0);
}

#[tokio::test]
async fn test_public_search_returns_previews() {
    // Arrange
    let world = TestWorld::new();
    let long_description = "Overflowing drain ".repeat(20);
    let receipt = world
        .submit_input(
            SubmissionBuilder::new()
                .with_category("Sanitation & Drainage")
                .with_description(long_description.clone())
                .build(),
            Some(UserId::new(1)),
        )
        .await
        .unwrap()
        .value;
    world.submit(None).await;

    // Act
    let by_code = world
        .queries
        .search(
            PublicSearchQuery {
                q: Some(receipt.complaint_code.as_str().to_lowercase()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let by_category = world
        .queries
        .search(
            PublicSearchQuery {
                category: Some("Sanitation & Drainage".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(by_code.total, 1);
    let item = &by_code.items[0];
    assert_eq!(item.complaint_code, receipt.complaint_code);
    assert_eq!(item.description_preview.chars().count(), DESCRIPTION_PREVIEW_CHARS);
    assert!(long_description.starts_with(&item.description_preview));
    assert_eq!(by_category.total, 1);
}

#[tokio::test]
async fn test_statistics_cover_every_category() {
    let world = TestWorld::new();
    let union = world.admin(AdminRole::UnionOffice);
    let first = world.submit(None).await;
    world.submit(None).await;
    world
        .submit_input(
            SubmissionBuilder::new().with_category("Public Safety").build(),
            None,
        )
        .await
        .unwrap();
    world
        .engine
        .update_status(&union, first.id, ComplaintStatus::Resolved, None)
        .await
        .unwrap();

    let stats = world.queries.statistics().await.unwrap();

    assert_eq!(stats.total_complaints, 3);
    assert_eq!(stats.resolved_complaints, 1);
    assert_eq!(stats.resolution_rate, 33);
    assert_eq!(stats.complaints_by_status.get("pending"), Some(&2));
    assert_eq!(stats.complaints_by_status.get("resolved"), Some(&1));
    assert_eq!(stats.complaints_by_category.len(), DEFAULT_CATEGORIES.len());
    assert_eq!(stats.complaints_by_category[0].category, "Water Supply Issues");
    assert_eq!(stats.complaints_by_category[0].count, 2);
    assert_eq!(stats.complaints_by_category[1].category, "Public Safety");
    assert_eq!(stats.complaints_by_category[2].count, 0);
}

#[tokio::test]
async fn test_retired_category_keeps_its_complaints_visible() {
    // Arrange
    let world = TestWorld::new();
    let union = world.admin(AdminRole::UnionOffice);
    let receipt = world.submit(None).await;
    assert!(world.stores.categories.deactivate("Water Supply Issues"));

    // Act
    let detail = world
        .queries
        .get_status(receipt.complaint_code.as_str())
        .await
        .unwrap();
    let listed = world
        .queries
        .list_for_admin(
            &union,
            AdminComplaintQuery {
                category: Some("Water Supply Issues".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let stats = world.queries.statistics().await.unwrap();
    let new_submission = world
        .submit_input(
            SubmissionBuilder::new().with_category("Water Supply Issues").build(),
            None,
        )
        .await;

    // Assert
    assert_eq!(detail.complaint.category_name.as_deref(), Some("Water Supply Issues"));
    assert_eq!(listed.total, 1);
    assert_eq!(listed.items[0].category_name.as_deref(), Some("Water Supply Issues"));
    assert_eq!(stats.total_complaints, 1);
    assert_eq!(stats.complaints_by_category.len(), DEFAULT_CATEGORIES.len());
    assert_eq!(stats.complaints_by_category[0].category, "Water Supply Issues");
    assert_eq!(stats.complaints_by_category[0].count, 1);
    assert!(matches!(new_submission, Err(ApplicationError::InvalidCategory(_))));
}

#[tokio::test]
async fn test_empty_statistics_have_zero_rate() {
    let world = TestWorld::new();

    let stats = world.queries.statistics().await.unwrap();

    assert_eq!(stats.total_complaints, 0);
    assert_eq!(stats.resolution_rate, 0);
    assert!(stats.complaints_by_status.is_empty());
}

#[tokio::test]
async fn test_dashboard_is_office_scoped_with_recent_window() {
    let world = TestWorld::new();
    let union = world.admin(AdminRole::UnionOffice);
    let collector = world.admin(AdminRole::CollectorOffice);

    world.submit(None).await;
    let forwarded = world.submit(None).await;
    world
        .engine
        .forward(&union, forwarded.id, Office::CollectorOffice, None)
        .await
        .unwrap();
    world.advance(Duration::days(8));
    world.submit(None).await;

    let union_dash = world.queries.dashboard(&union).await.unwrap();
    assert_eq!(union_dash.total_complaints, 2);
    assert_eq!(union_dash.recent_complaints, 1);
    assert_eq!(union_dash.complaints_by_urgency.get("medium"), Some(&2));

    let collector_dash = world.queries.dashboard(&collector).await.unwrap();
    assert_eq!(collector_dash.total_complaints, 1);
    assert_eq!(collector_dash.recent_complaints, 0);
}

#[tokio::test]
async fn test_assignable_admins_follow_role() {
    let world = TestWorld::new();
    let union = world.admin(AdminRole::UnionOffice);
    let super_admin = world.admin(AdminRole::SuperAdmin);
    world.stores.admins.deactivate(world.admin(AdminRole::CmOffice).id);

    let for_union = world.queries.list_assignable_admins(&union).await.unwrap();
    assert_eq!(for_union.len(), 2);
    assert!(for_union.iter().all(|a| a.role == AdminRole::UnionOffice));

    let for_super = world
        .queries
        .list_assignable_admins(&super_admin)
        .await
        .unwrap();
    assert_eq!(for_super.len(), 6);
    let names: Vec<_> = for_super.iter().map(|a| a.name.clone()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[tokio::test]
async fn test_notification_inbox() {
    // Arrange
    let world = TestWorld::new();
    let union = world.admins(AdminRole::UnionOffice);
    world.submit(None).await;
    world.submit(None).await;

    // Act
    let unread = world.inbox.list(&union[0], true, None).await.unwrap();

    // Assert
    assert_eq!(unread.total, 2);
    let newest = unread.items[0].id;

    let foreign = world.inbox.mark_read(&union[1], newest).await.unwrap_err();
    assert!(matches!(foreign, ApplicationError::NotFound(_)));
    let missing = world
        .inbox
        .mark_read(&union[0], NotificationId::new(9_999))
        .await
        .unwrap_err();
    assert!(matches!(missing, ApplicationError::NotFound(_)));

    world.inbox.mark_read(&union[0], newest).await.unwrap();
    assert_eq!(world.inbox.list(&union[0], true, None).await.unwrap().total, 1);
    assert_eq!(world.inbox.mark_all_read(&union[0]).await.unwrap(), 1);
    assert_eq!(world.inbox.list(&union[0], true, None).await.unwrap().total, 0);
    assert_eq!(world.inbox.list(&union[0], false, None).await.unwrap().total, 2);
}

#[tokio::test]
async fn test_revoked_admin_credential_is_unauthorized() {
    let world = TestWorld::new();
    let union = world.admin(AdminRole::UnionOffice);
    let identity = world.identity_of(&union);
    assert!(world.guard.require_admin(&identity).await.is_ok());

    world.stores.admins.deactivate(union.id);

    let err = world.guard.require_admin(&identity).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Unauthorized(_)));

    let citizen = IdentityAssertion::citizen(UserId::new(3));
    let err = world.guard.require_admin(&citizen).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Forbidden(_)));
}

#[tokio::test]
async fn test_readiness_reflects_store_health() {
    let world = TestWorld::new();
    assert!(world.queries.ready().await.is_ok());

    world.stores.health.fail_with("connection refused");

    let err = world.queries.ready().await.unwrap_err();
    assert!(err.is_internal());
}
