//! Tests for partial failures and lost races
//!
//! A committed transition survives ledger and notification failures and
//! reports them; a lost optimistic update or an exhausted code allocation
//! fails before any secondary write.

use std::sync::Arc;
use vcm_application::{ApplicationError, ServiceConfig, SideEffect};
use vcm_domain::{AdminRole, ComplaintCode, ComplaintStatus, Office, Recipient, UserId};
use vcm_infrastructure::{InMemoryComplaintRepository, InMemoryNotificationRepository};
use vcm_testing::{
    FailingHistoryRepository, FailingNotificationRepository, RacingComplaintRepository,
    ScriptedCodeGenerator, SubmissionBuilder, TestWorld,
};

#[tokio::test]
async fn test_ledger_failure_degrades_but_commits() {
    // Arrange
    let ledger = Arc::new(FailingHistoryRepository::new());
    let world = TestWorld::builder().with_history(ledger.clone()).build();

    // Act
    let committed = world
        .submit_input(SubmissionBuilder::new().build(), Some(UserId::new(3)))
        .await
        .unwrap();

    // Assert
    assert!(committed.is_degraded(SideEffect::Ledger));
    assert!(!committed.is_degraded(SideEffect::Notification));
    assert_eq!(ledger.attempts(), 1);
    assert_eq!(world.stores.complaints.len(), 1);

    let union = world.admin(AdminRole::UnionOffice);
    assert_eq!(
        world.notifications_for(Recipient::Admin(union.id)).len(),
        1
    );
    assert!(committed.warnings()[0].starts_with("status history was not recorded"));
}

#[tokio::test]
async fn test_partial_notification_failure_is_reported() {
    let inner = Arc::new(InMemoryNotificationRepository::new());
    let directory = vcm_testing::create_test_directory();
    let union_ids: Vec<_> = directory
        .iter()
        .filter(|a| a.role == AdminRole::UnionOffice)
        .map(|a| a.id)
        .collect();
    let failing = FailingNotificationRepository::for_recipients(
        inner.clone(),
        [Recipient::Admin(union_ids[0])],
    );
    let world = TestWorld::builder()
        .with_admins(directory)
        .with_notifications(Arc::new(failing))
        .build();

    let committed = world
        .submit_input(SubmissionBuilder::new().build(), None)
        .await
        .unwrap();

    assert!(committed.is_degraded(SideEffect::Notification));
    assert!(committed.warnings()[0].contains("1 of 2 notifications failed"));
    assert!(inner.addressed_to(Recipient::Admin(union_ids[0])).is_empty());
    assert_eq!(inner.addressed_to(Recipient::Admin(union_ids[1])).len(), 1);
    assert_eq!(world.history(committed.value.id).await.len(), 1);
}

#[tokio::test]
async fn test_status_change_survives_notification_outage() {
    let world = TestWorld::builder()
        .with_notifications(Arc::new(FailingNotificationRepository::always()))
        .build();
    let submitted = world
        .submit_input(SubmissionBuilder::new().build(), Some(UserId::new(9)))
        .await
        .unwrap();
    assert!(submitted.is_degraded(SideEffect::Notification));

    let union = world.admin(AdminRole::UnionOffice);
    let changed = world
        .engine
        .update_status(&union, submitted.value.id, ComplaintStatus::Resolved, None)
        .await
        .unwrap();

    assert!(changed.is_degraded(SideEffect::Notification));
    assert_eq!(
        world.complaint(submitted.value.id).await.status,
        ComplaintStatus::Resolved
    );
    assert_eq!(world.history(submitted.value.id).await.len(), 2);
}

#[tokio::test]
async fn test_lost_update_conflicts_without_side_effects() {
    // Arrange
    let complaints = Arc::new(InMemoryComplaintRepository::new());
    let racing = Arc::new(RacingComplaintRepository::new(complaints.clone()));
    let world = TestWorld::builder().with_complaints(racing.clone()).build();
    let citizen = UserId::new(21);
    let receipt = world.submit(Some(citizen)).await;
    let union = world.admin(AdminRole::UnionOffice);
    let notifications_before = world.stores.notifications.len();

    // Act
    racing.arm(1);
    let err = world
        .engine
        .update_status(&union, receipt.id, ComplaintStatus::Resolved, None)
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(err, ApplicationError::Conflict(_)));
    assert_eq!(err.http_status(), 409);
    let stored = world.complaint(receipt.id).await;
    assert_eq!(stored.status, ComplaintStatus::Pending);
    assert_eq!(stored.version, 2);
    assert_eq!(world.history(receipt.id).await.len(), 1);
    assert_eq!(world.stores.notifications.len(), notifications_before);
    assert!(world
        .notifications_for(Recipient::Citizen(citizen))
        .is_empty());
}

#[tokio::test]
async fn test_retry_after_conflict_succeeds() {
    let complaints = Arc::new(InMemoryComplaintRepository::new());
    let racing = Arc::new(RacingComplaintRepository::new(complaints));
    let world = TestWorld::builder().with_complaints(racing.clone()).build();
    let receipt = world.submit(None).await;
    let union = world.admin(AdminRole::UnionOffice);

    racing.arm(1);
    assert!(world
        .engine
        .forward(&union, receipt.id, Office::CollectorOffice, None)
        .await
        .is_err());

    world
        .engine
        .forward(&union, receipt.id, Office::CollectorOffice, None)
        .await
        .unwrap();
    assert_eq!(
        world.complaint(receipt.id).await.current_office,
        Office::CollectorOffice
    );
}

#[tokio::test]
async fn test_code_collision_draws_a_fresh_code() {
    // Arrange
    let taken = ComplaintCode::compose(1_717_232_400_000, 5);
    let fresh = ComplaintCode::compose(1_717_232_400_001, 6);
    let codes = Arc::new(ScriptedCodeGenerator::new([
        taken.clone(),
        taken.clone(),
        fresh.clone(),
    ]));
    let world = TestWorld::builder().with_codes(codes.clone()).build();

    // Act
    let first = world.submit(None).await;
    let second = world.submit(None).await;

    // Assert
    assert_eq!(first.complaint_code, taken);
    assert_eq!(second.complaint_code, fresh);
    assert_eq!(codes.issued(), 3);
    assert_eq!(world.stores.complaints.len(), 2);
}

#[tokio::test]
async fn test_exhausted_code_attempts_conflict() {
    let taken = ComplaintCode::compose(1_717_232_400_000, 5);
    let codes = Arc::new(ScriptedCodeGenerator::repeating(taken, 10));
    let config = ServiceConfig {
        code_attempts: 2,
        ..ServiceConfig::default()
    };
    let world = TestWorld::builder()
        .with_codes(codes)
        .with_config(config)
        .build();
    world.submit(None).await;
    let notifications_before = world.stores.notifications.len();

    let err = world
        .submit_input(SubmissionBuilder::new().build(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApplicationError::Conflict(_)));
    assert_eq!(world.stores.complaints.len(), 1);
    assert_eq!(world.stores.history.len(), 1);
    assert_eq!(world.stores.notifications.len(), notifications_before);
}
