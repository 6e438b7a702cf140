//! Cancellation of background work.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::cell::ObservableCell;
use crate::scope::Scope;

#[tokio::test]
async fn run_completes_when_not_cancelled() {
    let scope = Scope::new();
    assert_eq!(scope.run(async { 7 }).await, Some(7));
}

#[tokio::test]
async fn cancelled_scope_skips_the_write() {
    let scope = Scope::new();
    let cache = ObservableCell::new(0);
    let release = Arc::new(Notify::new());

    let handle = scope.spawn({
        let cache = cache.clone();
        let release = Arc::clone(&release);
        async move {
            release.notified().await;
            cache.set(1);
        }
    });

    scope.cancel();
    release.notify_one();

    assert_eq!(handle.await.unwrap(), None);
    assert_eq!(cache.get(), 0);
}

#[tokio::test]
async fn dropping_scope_cancels_children() {
    let scope = Scope::new();
    let child = scope.child();
    let token = child.token();

    drop(scope);

    assert!(child.is_cancelled());
    assert!(token.is_cancelled());
    assert_eq!(
        child
            .run(tokio::time::sleep(Duration::from_secs(60)))
            .await,
        None
    );
}

#[tokio::test]
async fn cancelling_child_leaves_parent_running() {
    let scope = Scope::new();
    let child = scope.child();

    child.cancel();

    assert!(!scope.is_cancelled());
    assert_eq!(scope.run(async { "ok" }).await, Some("ok"));
}
