//! Friend graph endpoints.

use agora_types::{DataResult, FriendGraph, UserId};
use reqwest::Method;
use serde::Serialize;

use crate::AgoraClient;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FriendRequestBody<'a> {
    user_id: &'a UserId,
}

impl AgoraClient {
    /// `GET /v1/friends`: friends plus pending requests in both directions.
    pub async fn friends(&self) -> DataResult<FriendGraph> {
        Ok(self.get_json(&["friends"], &[]).await?)
    }

    /// `POST /v1/friends/requests`.
    pub async fn send_friend_request(&self, user_id: &UserId) -> DataResult<()> {
        let body = FriendRequestBody { user_id };
        Ok(self
            .send_json_unit(Method::POST, &["friends", "requests"], &body)
            .await?)
    }

    /// `POST /v1/friends/requests/{userId}/accept`.
    pub async fn accept_friend_request(&self, user_id: &UserId) -> DataResult<()> {
        Ok(self
            .send_unit(
                Method::POST,
                &["friends", "requests", user_id.as_str(), "accept"],
            )
            .await?)
    }

    /// `POST /v1/friends/requests/{userId}/reject`.
    pub async fn reject_friend_request(&self, user_id: &UserId) -> DataResult<()> {
        Ok(self
            .send_unit(
                Method::POST,
                &["friends", "requests", user_id.as_str(), "reject"],
            )
            .await?)
    }

    /// `DELETE /v1/friends/{userId}`.
    pub async fn remove_friend(&self, user_id: &UserId) -> DataResult<()> {
        Ok(self
            .send_unit(Method::DELETE, &["friends", user_id.as_str()])
            .await?)
    }
}
