//! Friend graph snapshot.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::user::User;

/// A pending friend request between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub sender: User,
    pub receiver: User,
}

/// Everything `GET /v1/friends` returns for the current user.
///
/// The three lists are only ever replaced together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendGraph {
    #[serde(default)]
    pub current_friends: Vec<User>,
    #[serde(default)]
    pub outgoing_requests: Vec<FriendRequest>,
    #[serde(default)]
    pub incoming_requests: Vec<FriendRequest>,
}

impl FriendGraph {
    pub fn is_friend(&self, user_id: &UserId) -> bool {
        self.current_friends.iter().any(|u| &u.id == user_id)
    }

    pub fn has_outgoing_request_to(&self, user_id: &UserId) -> bool {
        self.outgoing_requests
            .iter()
            .any(|r| &r.receiver.id == user_id)
    }

    pub fn has_incoming_request_from(&self, user_id: &UserId) -> bool {
        self.incoming_requests.iter().any(|r| &r.sender.id == user_id)
    }
}
