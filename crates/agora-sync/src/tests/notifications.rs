//! Optimistic read flags.

use agora_types::{DataError, NotificationId};

use super::harness::{notification, TestHarness};
use crate::notifications::{NotificationEntry, ReadOutcome};

async fn loaded(harness: &TestHarness, read: &[(&str, bool)]) {
    harness.remote.state.lock().notifications = read
        .iter()
        .map(|(id, read)| notification(id, *read))
        .collect();
    harness.services.notifications.refresh().await.unwrap();
}

fn entry(harness: &TestHarness, id: &str) -> NotificationEntry {
    harness
        .services
        .notifications
        .notifications()
        .get(&NotificationId::from(id))
        .unwrap()
}

#[tokio::test]
async fn mark_read_applies_and_rolls_back() {
    let harness = TestHarness::new();
    loaded(&harness, &[("n1", false), ("n2", false)]).await;
    assert_eq!(harness.services.notifications.unread_count(), 2);

    let n1 = entry(&harness, "n1");
    assert_eq!(
        harness.services.notifications.mark_read(&n1).await,
        ReadOutcome::Applied
    );
    assert!(n1.read.get());

    let n2 = entry(&harness, "n2");
    harness
        .remote
        .fail_next("mark_notification_read", DataError::InternalServerError);
    assert_eq!(
        harness.services.notifications.mark_read(&n2).await,
        ReadOutcome::RolledBack(DataError::InternalServerError)
    );
    assert!(!n2.read.get());
    assert_eq!(harness.services.notifications.unread_count(), 1);
}

#[tokio::test]
async fn already_read_sends_nothing() {
    let harness = TestHarness::new();
    loaded(&harness, &[("n1", true)]).await;

    let n1 = entry(&harness, "n1");
    assert_eq!(
        harness.services.notifications.mark_read(&n1).await,
        ReadOutcome::Unchanged
    );
    assert_eq!(
        harness.services.notifications.mark_all_read().await,
        ReadOutcome::Unchanged
    );
    assert_eq!(harness.remote.call_count("mark_notification_read"), 0);
    assert_eq!(harness.remote.call_count("mark_all_notifications_read"), 0);
}

#[tokio::test]
async fn mark_all_restores_only_what_it_flipped() {
    let harness = TestHarness::new();
    loaded(&harness, &[("n1", true), ("n2", false), ("n3", false)]).await;

    harness
        .remote
        .fail_next("mark_all_notifications_read", DataError::NoInternet);
    assert_eq!(
        harness.services.notifications.mark_all_read().await,
        ReadOutcome::RolledBack(DataError::NoInternet)
    );

    assert!(entry(&harness, "n1").read.get());
    assert!(!entry(&harness, "n2").read.get());
    assert!(!entry(&harness, "n3").read.get());

    assert_eq!(
        harness.services.notifications.mark_all_read().await,
        ReadOutcome::Applied
    );
    assert_eq!(harness.services.notifications.unread_count(), 0);
}

#[tokio::test]
async fn mark_all_skips_entry_with_read_in_flight() {
    let harness = TestHarness::new();
    loaded(&harness, &[("n1", false), ("n2", false)]).await;
    let n1 = entry(&harness, "n1");
    let gate = harness.remote.hold("mark_notification_read");

    let single = harness.services.notifications.mark_read(&n1);
    let all = async {
        harness
            .remote
            .fail_next("mark_all_notifications_read", DataError::Conflict);
        let outcome = harness.services.notifications.mark_all_read().await;
        gate.notify_one();
        outcome
    };
    let (single, all) = tokio::join!(single, all);

    assert_eq!(single, ReadOutcome::Applied);
    assert_eq!(all, ReadOutcome::RolledBack(DataError::Conflict));
    assert!(n1.read.get());
    assert!(!entry(&harness, "n2").read.get());
}

#[tokio::test]
async fn single_failure_after_accepted_mark_all_stays_read() {
    let harness = TestHarness::new();
    loaded(&harness, &[("n1", false), ("n2", false)]).await;
    let n1 = entry(&harness, "n1");
    let gate = harness.remote.hold("mark_notification_read");
    harness
        .remote
        .fail_next("mark_notification_read", DataError::NoInternet);

    let single = harness.services.notifications.mark_read(&n1);
    let all = async {
        let outcome = harness.services.notifications.mark_all_read().await;
        gate.notify_one();
        outcome
    };
    let (single, all) = tokio::join!(single, all);

    assert_eq!(all, ReadOutcome::Applied);
    assert_eq!(single, ReadOutcome::Applied);
    assert!(n1.read.get());
    assert_eq!(harness.services.notifications.unread_count(), 0);
}

#[tokio::test]
async fn register_push_token_surfaces_errors() {
    let harness = TestHarness::new();
    harness
        .services
        .notifications
        .register_push_token("device-token")
        .await
        .unwrap();

    harness
        .remote
        .fail_next("register_push_token", DataError::Unauthorized);
    assert_eq!(
        harness
            .services
            .notifications
            .register_push_token("device-token")
            .await,
        Err(DataError::Unauthorized)
    );
}
