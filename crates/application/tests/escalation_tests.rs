//! Tests for the escalation engine
//!
//! Submission, status updates, assignment and forwarding against in-memory
//! stores, including authority checks and the ledger/notification trail.

use vcm_application::ApplicationError;
use vcm_domain::{
    AdminId, AdminRole, ComplaintId, ComplaintStatus, NotificationType, Office, Recipient, UserId,
};
use vcm_testing::{SubmissionBuilder, TestWorld};

#[tokio::test]
async fn test_submission_starts_pending_at_union_office() {
    // Arrange
    let world = TestWorld::new();
    let citizen = UserId::new(42);

    // Act
    let receipt = world.submit(Some(citizen)).await;

    // Assert
    assert_eq!(receipt.status, ComplaintStatus::Pending);
    assert!(receipt.complaint_code.as_str().starts_with("VCM"));
    assert_eq!(receipt.complaint_code.as_str().len(), 12);

    let stored = world.complaint(receipt.id).await;
    assert_eq!(stored.current_office, Office::UnionOffice);
    assert_eq!(stored.submitter, Some(citizen));
    assert_eq!(stored.assigned_to, None);
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn test_submission_records_creation_and_notifies_union_office() {
    let world = TestWorld::new();

    let receipt = world.submit(None).await;

    let history = world.history(receipt.id).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_status, None);
    assert_eq!(history[0].new_status, ComplaintStatus::Pending);
    assert_eq!(history[0].changed_by, None);

    for admin in world.admins(AdminRole::UnionOffice) {
        let inbox = world.notifications_for(Recipient::Admin(admin.id));
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationType::ComplaintSubmitted);
        assert_eq!(inbox[0].complaint_id, receipt.id);
    }
    let collector = world.admin(AdminRole::CollectorOffice);
    assert!(world
        .notifications_for(Recipient::Admin(collector.id))
        .is_empty());
}

#[tokio::test]
async fn test_anonymous_submission_discards_contact() {
    let world = TestWorld::new();
    let input = SubmissionBuilder::new().anonymous().build();
    assert!(input.contact.is_some());

    let committed = world.submit_input(input, None).await.unwrap();

    let stored = world.complaint(committed.value.id).await;
    assert!(stored.is_anonymous);
    assert_eq!(stored.contact, None);
}

#[tokio::test]
async fn test_unknown_or_inactive_category_is_rejected() {
    let world = TestWorld::new();
    world.stores.categories.deactivate("Others");

    for category in ["Street Dogs", "Others"] {
        let input = SubmissionBuilder::new().with_category(category).build();
        let err = world.submit_input(input, None).await.unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidCategory(_)));
    }
    assert!(world.stores.complaints.is_empty());
    assert!(world.stores.notifications.is_empty());
}

#[tokio::test]
async fn test_status_update_tracks_resolution_time() {
    // Arrange
    let world = TestWorld::new();
    let citizen = UserId::new(7);
    let receipt = world.submit(Some(citizen)).await;
    let union = world.admin(AdminRole::UnionOffice);

    // Act
    let resolved = world
        .engine
        .update_status(
            &union,
            receipt.id,
            ComplaintStatus::Resolved,
            Some("Tap repaired".to_string()),
        )
        .await
        .unwrap();

    // Assert
    assert!(resolved.is_complete());
    assert_eq!(resolved.value.old_status, ComplaintStatus::Pending);
    assert!(world.complaint(receipt.id).await.resolved_at.is_some());

    world
        .engine
        .update_status(&union, receipt.id, ComplaintStatus::InProgress, None)
        .await
        .unwrap();
    let reopened = world.complaint(receipt.id).await;
    assert_eq!(reopened.status, ComplaintStatus::InProgress);
    assert_eq!(reopened.resolved_at, None);
    assert_eq!(reopened.version, 3);
}

#[tokio::test]
async fn test_status_update_writes_ledger_and_notifies_citizen() {
    let world = TestWorld::new();
    let citizen = UserId::new(11);
    let receipt = world.submit(Some(citizen)).await;
    let union = world.admin(AdminRole::UnionOffice);

    world
        .engine
        .update_status(
            &union,
            receipt.id,
            ComplaintStatus::Acknowledged,
            Some("  Seen  ".to_string()),
        )
        .await
        .unwrap();

    let history = world.history(receipt.id).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].old_status, Some(ComplaintStatus::Pending));
    assert_eq!(history[1].new_status, ComplaintStatus::Acknowledged);
    assert_eq!(history[1].comment.as_deref(), Some("Seen"));
    assert_eq!(history[1].changed_by, Some(union.id));

    let inbox = world.notifications_for(Recipient::Citizen(citizen));
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationType::StatusChanged);
    assert!(inbox[0].message.ends_with("updated to acknowledged"));
}

#[tokio::test]
async fn test_anonymous_complaint_status_change_notifies_nobody() {
    let world = TestWorld::new();
    let receipt = world.submit(None).await;
    let union = world.admin(AdminRole::UnionOffice);
    let before = world.stores.notifications.len();

    world
        .engine
        .update_status(&union, receipt.id, ComplaintStatus::Rejected, None)
        .await
        .unwrap();

    assert_eq!(world.stores.notifications.len(), before);
}

#[tokio::test]
async fn test_other_office_cannot_touch_complaint() {
    let world = TestWorld::new();
    let receipt = world.submit(None).await;
    let collector = world.admin(AdminRole::CollectorOffice);

    let err = world
        .engine
        .update_status(&collector, receipt.id, ComplaintStatus::Resolved, None)
        .await
        .unwrap_err();

    assert_eq!(err, ApplicationError::complaint_not_found());
    assert_eq!(world.complaint(receipt.id).await.status, ComplaintStatus::Pending);
    assert_eq!(world.history(receipt.id).await.len(), 1);
}

#[tokio::test]
async fn test_missing_complaint_is_not_found() {
    let world = TestWorld::new();
    let union = world.admin(AdminRole::UnionOffice);

    let err = world
        .engine
        .update_status(&union, ComplaintId::new(404), ComplaintStatus::Resolved, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApplicationError::NotFound(_)));
}

#[tokio::test]
async fn test_super_admin_updates_any_office() {
    let world = TestWorld::new();
    let receipt = world.submit(None).await;
    let union = world.admin(AdminRole::UnionOffice);
    let super_admin = world.admin(AdminRole::SuperAdmin);

    world
        .engine
        .forward(&union, receipt.id, Office::CmOffice, None)
        .await
        .unwrap();
    world
        .engine
        .update_status(&super_admin, receipt.id, ComplaintStatus::InProgress, None)
        .await
        .unwrap();

    assert_eq!(world.complaint(receipt.id).await.status, ComplaintStatus::InProgress);
}

#[tokio::test]
async fn test_assignment_binds_office_member_and_notifies_assignee() {
    // Arrange
    let world = TestWorld::new();
    let receipt = world.submit(None).await;
    let union = world.admins(AdminRole::UnionOffice);
    let (lead, colleague) = (&union[0], &union[1]);

    // Act
    let committed = world
        .engine
        .assign(lead, receipt.id, colleague.id, Some("Please inspect".to_string()))
        .await
        .unwrap();

    // Assert
    assert_eq!(committed.value.assigned_to.id, colleague.id);
    assert_eq!(committed.value.assigned_to.role, AdminRole::UnionOffice);

    let stored = world.complaint(receipt.id).await;
    assert_eq!(stored.assigned_to, Some(colleague.id));
    assert_eq!(stored.status, ComplaintStatus::Pending);

    let history = world.history(receipt.id).await;
    let entry = history.last().unwrap();
    assert_eq!(entry.old_status, Some(ComplaintStatus::Pending));
    assert_eq!(entry.new_status, ComplaintStatus::Pending);
    assert_eq!(
        entry.comment.as_deref(),
        Some(format!("Assigned to {}. Please inspect", colleague.name).as_str())
    );

    let inbox = world.notifications_for(Recipient::Admin(colleague.id));
    assert!(inbox.iter().any(|n| n.kind == NotificationType::Assigned));
}

#[tokio::test]
async fn test_assignee_must_be_active_member_of_current_office() {
    let world = TestWorld::new();
    let receipt = world.submit(None).await;
    let union = world.admins(AdminRole::UnionOffice);
    let collector = world.admin(AdminRole::CollectorOffice);

    let outsider = world
        .engine
        .assign(&union[0], receipt.id, collector.id, None)
        .await
        .unwrap_err();
    assert!(matches!(outsider, ApplicationError::InvalidAssignee(_)));

    world.stores.admins.deactivate(union[1].id);
    let inactive = world
        .engine
        .assign(&union[0], receipt.id, union[1].id, None)
        .await
        .unwrap_err();
    assert!(matches!(inactive, ApplicationError::InvalidAssignee(_)));

    let unknown = world
        .engine
        .assign(&union[0], receipt.id, AdminId::new(999), None)
        .await
        .unwrap_err();
    assert!(matches!(unknown, ApplicationError::InvalidAssignee(_)));

    assert_eq!(world.complaint(receipt.id).await.assigned_to, None);
}

#[tokio::test]
async fn test_forward_moves_custody_and_clears_assignee() {
    // Arrange
    let world = TestWorld::new();
    let receipt = world.submit(None).await;
    let union = world.admins(AdminRole::UnionOffice);
    world
        .engine
        .assign(&union[0], receipt.id, union[1].id, None)
        .await
        .unwrap();

    // Act
    let committed = world
        .engine
        .forward(
            &union[0],
            receipt.id,
            Office::CollectorOffice,
            Some("Needs district funds".to_string()),
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(committed.value.target_office, Office::CollectorOffice);
    let stored = world.complaint(receipt.id).await;
    assert_eq!(stored.current_office, Office::CollectorOffice);
    assert_eq!(stored.assigned_to, None);
    assert_eq!(stored.status, ComplaintStatus::Pending);

    let entry = world.history(receipt.id).await.pop().unwrap();
    assert_eq!(
        entry.comment.as_deref(),
        Some("Forwarded to collector_office. Needs district funds")
    );

    for admin in world.admins(AdminRole::CollectorOffice) {
        let inbox = world.notifications_for(Recipient::Admin(admin.id));
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationType::ComplaintSubmitted);
        assert_eq!(inbox[0].title, "Complaint Forwarded");
    }
}

#[tokio::test]
async fn test_forward_only_climbs_the_hierarchy() {
    let world = TestWorld::new();
    let receipt = world.submit(None).await;
    let union = world.admin(AdminRole::UnionOffice);
    let collector = world.admin(AdminRole::CollectorOffice);

    let same = world
        .engine
        .forward(&union, receipt.id, Office::UnionOffice, None)
        .await
        .unwrap_err();
    assert!(matches!(same, ApplicationError::InvalidTransition(_)));

    world
        .engine
        .forward(&union, receipt.id, Office::CollectorOffice, None)
        .await
        .unwrap();

    let back = world
        .engine
        .forward(&collector, receipt.id, Office::UnionOffice, None)
        .await
        .unwrap_err();
    assert!(matches!(back, ApplicationError::InvalidTransition(_)));
    assert_eq!(
        world.complaint(receipt.id).await.current_office,
        Office::CollectorOffice
    );
}

#[tokio::test]
async fn test_union_may_skip_straight_to_cm_office() {
    let world = TestWorld::new();
    let receipt = world.submit(None).await;
    let union = world.admin(AdminRole::UnionOffice);

    world
        .engine
        .forward(&union, receipt.id, Office::CmOffice, None)
        .await
        .unwrap();

    assert_eq!(world.complaint(receipt.id).await.current_office, Office::CmOffice);
}

#[tokio::test]
async fn test_only_holding_office_may_forward() {
    let world = TestWorld::new();
    let receipt = world.submit(None).await;
    let super_admin = world.admin(AdminRole::SuperAdmin);
    let collector = world.admin(AdminRole::CollectorOffice);

    let by_super = world
        .engine
        .forward(&super_admin, receipt.id, Office::CollectorOffice, None)
        .await
        .unwrap_err();
    assert!(matches!(by_super, ApplicationError::NotFound(_)));

    let by_other_office = world
        .engine
        .forward(&collector, receipt.id, Office::CmOffice, None)
        .await
        .unwrap_err();
    assert!(matches!(by_other_office, ApplicationError::NotFound(_)));
}

#[tokio::test]
async fn test_missing_complaint_is_reported_before_bad_target() {
    let world = TestWorld::new();
    let union = world.admin(AdminRole::UnionOffice);

    let err = world
        .engine
        .forward(&union, ComplaintId::new(77), Office::UnionOffice, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApplicationError::NotFound(_)));
}

#[tokio::test]
async fn test_forwarded_complaint_leaves_previous_office() {
    let world = TestWorld::new();
    let receipt = world.submit(None).await;
    let union = world.admin(AdminRole::UnionOffice);
    let collector = world.admin(AdminRole::CollectorOffice);

    world
        .engine
        .forward(&union, receipt.id, Office::CollectorOffice, None)
        .await
        .unwrap();

    let err = world
        .engine
        .update_status(&union, receipt.id, ComplaintStatus::Resolved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::NotFound(_)));

    world
        .engine
        .update_status(&collector, receipt.id, ComplaintStatus::Resolved, None)
        .await
        .unwrap();
}
