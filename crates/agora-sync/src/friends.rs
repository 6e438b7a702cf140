//! Friend graph.
//!
//! Friend actions never patch the local graph. Every successful action is
//! followed by a full `GET /v1/friends`, and the three collections are
//! replaced together as one value.

use std::sync::Arc;

use agora_types::{DataResult, FriendGraph, UserId};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cell::ObservableCell;
use crate::remote::FriendRemote;
use crate::session::AuthState;

/// A friend action, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FriendAction {
    Send,
    Accept,
    Reject,
    Remove,
}

/// Owns the friend graph of the logged-in user.
pub struct FriendRepository {
    remote: Arc<dyn FriendRemote>,
    auth: AuthState,
    graph: ObservableCell<Arc<FriendGraph>>,
}

impl FriendRepository {
    pub fn new(remote: Arc<dyn FriendRemote>, auth: AuthState) -> Self {
        Self {
            remote,
            auth,
            graph: ObservableCell::default(),
        }
    }

    /// Current snapshot.
    pub fn graph(&self) -> Arc<FriendGraph> {
        self.graph.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<FriendGraph>> {
        self.graph.subscribe()
    }

    /// Fetch the full snapshot and replace all three collections at once.
    ///
    /// On failure the graph is left untouched.
    pub async fn update_local_user_friend(&self) -> DataResult<()> {
        let graph = self.remote.friends().await?;
        debug!(
            friend_count = graph.current_friends.len(),
            outgoing_count = graph.outgoing_requests.len(),
            incoming_count = graph.incoming_requests.len(),
            "Friend graph synced"
        );
        self.graph.set(Arc::new(graph));
        Ok(())
    }

    /// Load the graph for the logged-in user.
    pub async fn refresh(&self) -> DataResult<()> {
        self.auth.require()?;
        self.update_local_user_friend().await
    }

    pub async fn send_request(&self, user_id: &UserId) -> DataResult<()> {
        self.run(FriendAction::Send, user_id).await
    }

    pub async fn accept_request(&self, user_id: &UserId) -> DataResult<()> {
        self.run(FriendAction::Accept, user_id).await
    }

    pub async fn reject_request(&self, user_id: &UserId) -> DataResult<()> {
        self.run(FriendAction::Reject, user_id).await
    }

    pub async fn remove_friend(&self, user_id: &UserId) -> DataResult<()> {
        self.run(FriendAction::Remove, user_id).await
    }

    async fn run(&self, action: FriendAction, user_id: &UserId) -> DataResult<()> {
        self.auth.require()?;

        let result = match action {
            FriendAction::Send => self.remote.send_friend_request(user_id).await,
            FriendAction::Accept => self.remote.accept_friend_request(user_id).await,
            FriendAction::Reject => self.remote.reject_friend_request(user_id).await,
            FriendAction::Remove => self.remote.remove_friend(user_id).await,
        };
        if let Err(e) = result {
            warn!(action = ?action, user_id = %user_id, error = %e, "Friend action failed");
            return Err(e);
        }

        info!(action = ?action, user_id = %user_id, "Friend action accepted");
        self.update_local_user_friend().await.inspect_err(|e| {
            warn!(error = %e, "Friend resync failed after successful action");
        })
    }

    pub fn clear(&self) {
        self.graph.set(Arc::default());
    }
}
