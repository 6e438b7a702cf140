//! Login, restore and logout.

use std::sync::Arc;

use agora_types::{AuthToken, ChannelId, DataError, UserId, VoteState};

use super::harness::{message, post, user, wait_for, FakeRemote, TestHarness};
use crate::session::{MemoryTokenStore, SessionRepository, TokenStore};

fn session_with_token(
    remote: &Arc<FakeRemote>,
    token: Option<&str>,
) -> (SessionRepository, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    if let Some(token) = token {
        store.save(&AuthToken::new(token)).unwrap();
    }
    let session = SessionRepository::new(remote.clone(), store.clone());
    (session, store)
}

#[tokio::test]
async fn login_persists_token_and_publishes_user() {
    let remote = FakeRemote::with_user();
    let (session, store) = session_with_token(&remote, None);
    let auth = session.auth();
    assert!(!auth.is_authenticated());

    let logged_in = session.login("u1", "pw").await.unwrap();

    assert_eq!(logged_in, user("u1"));
    assert_eq!(auth.user_id(), Some(UserId::from("u1")));
    assert_eq!(store.load().unwrap(), Some(AuthToken::new("token-u1")));
    assert_eq!(
        remote.state.lock().token,
        Some(AuthToken::new("token-u1"))
    );
}

#[tokio::test]
async fn failed_login_stays_anonymous() {
    let remote = FakeRemote::with_user();
    remote.fail_next("login", DataError::Unauthorized);
    let (session, store) = session_with_token(&remote, None);

    assert_eq!(
        session.login("u1", "wrong").await,
        Err(DataError::Unauthorized)
    );
    assert!(session.current_user().is_none());
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn failed_profile_fetch_after_login_leaves_no_session() {
    let remote = FakeRemote::with_user();
    remote.fail_next("current_user", DataError::InternalServerError);
    let (session, store) = session_with_token(&remote, None);

    assert_eq!(
        session.login("u1", "pw").await,
        Err(DataError::InternalServerError)
    );
    assert!(session.current_user().is_none());
    assert!(store.load().unwrap().is_none());
    assert!(remote.state.lock().token.is_none());

    // Nothing for a later launch to pick up either.
    assert_eq!(session.restore().await, Ok(None));
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn signup_conflicts_surface_as_is() {
    let remote = FakeRemote::with_user();
    remote.fail_next("signup", DataError::EmailTaken);
    let (session, _) = session_with_token(&remote, None);

    assert_eq!(
        session.signup("ada", "ada@example.com", "pw").await,
        Err(DataError::EmailTaken)
    );
    assert!(session.signup("ada", "ada2@example.com", "pw").await.is_ok());
    assert!(session.verify("ada2@example.com", "123456").await.is_ok());
}

#[tokio::test]
async fn restore_resumes_persisted_session() {
    let remote = FakeRemote::with_user();
    let (session, _) = session_with_token(&remote, Some("saved"));

    let restored = session.restore().await.unwrap();

    assert_eq!(restored, Some(user("u1")));
    assert!(session.auth().is_authenticated());
    assert_eq!(remote.state.lock().token, Some(AuthToken::new("saved")));
}

#[tokio::test]
async fn restore_without_token_is_anonymous() {
    let remote = FakeRemote::with_user();
    let (session, _) = session_with_token(&remote, None);

    assert_eq!(session.restore().await, Ok(None));
    assert_eq!(remote.call_count("current_user"), 0);
}

#[tokio::test]
async fn expired_token_is_discarded() {
    let remote = FakeRemote::with_user();
    remote.fail_next("current_user", DataError::Unauthorized);
    let (session, store) = session_with_token(&remote, Some("stale"));

    assert_eq!(session.restore().await, Ok(None));
    assert!(store.load().unwrap().is_none());
    assert!(remote.state.lock().token.is_none());
}

#[tokio::test]
async fn offline_restore_keeps_token() {
    let remote = FakeRemote::with_user();
    remote.fail_next("current_user", DataError::NoInternet);
    let (session, store) = session_with_token(&remote, Some("saved"));

    assert_eq!(session.restore().await, Err(DataError::NoInternet));
    assert_eq!(store.load().unwrap(), Some(AuthToken::new("saved")));
    assert!(!session.auth().is_authenticated());
}

#[tokio::test]
async fn logout_clears_every_cache_and_live_stream() {
    let harness = TestHarness::logged_in().await;
    let c1 = ChannelId::from("c1");
    harness.remote.state.lock().posts = vec![post("p1", 1, VoteState::None)];
    harness
        .remote
        .state
        .lock()
        .history
        .insert(c1.clone(), vec![message("m1", "c1", 1, "one")]);
    harness.services.posts.refresh(None).await.unwrap();
    harness.services.chat.load_history(&c1).await.unwrap();

    let mut status = harness.services.chat.connection_status();
    harness.services.chat.connect(&c1).await.unwrap();
    wait_for(&mut status, |connected| *connected).await;

    harness.services.logout().await;

    assert!(!harness.services.auth().is_authenticated());
    assert!(!harness.services.chat.is_connected());
    assert!(harness.services.posts.posts().is_empty());
    assert!(harness.services.chat.messages(&c1).is_empty());
    assert!(harness.remote.state.lock().token.is_none());
}

#[tokio::test]
async fn auth_state_follows_session() {
    let harness = TestHarness::new();
    let auth = harness.services.auth();
    let mut rx = auth.subscribe();

    harness.services.session.login("u1", "pw").await.unwrap();
    wait_for(&mut rx, Option::is_some).await;
    assert_eq!(auth.require(), Ok(user("u1")));

    harness.services.session.logout().await;
    wait_for(&mut rx, Option::is_none).await;
    assert_eq!(auth.require(), Err(DataError::Unauthorized));
}

#[tokio::test]
async fn profiles_do_not_need_a_session() {
    let harness = TestHarness::new();

    let profile = harness
        .services
        .session
        .user_profile("grace")
        .await
        .unwrap();

    assert_eq!(profile.username, "grace");
}
