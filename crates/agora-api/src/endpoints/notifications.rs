//! Notifications and push token registration.

use agora_types::{DataResult, Notification, NotificationId};
use reqwest::Method;
use serde::Serialize;

use crate::AgoraClient;

#[derive(Serialize)]
struct PushTokenBody<'a> {
    token: &'a str,
}

impl AgoraClient {
    /// `POST /v1/notifications/token`.
    pub async fn register_push_token(&self, token: &str) -> DataResult<()> {
        let body = PushTokenBody { token };
        Ok(self
            .send_json_unit(Method::POST, &["notifications", "token"], &body)
            .await?)
    }

    /// `GET /v1/notifications`.
    pub async fn notifications(&self) -> DataResult<Vec<Notification>> {
        Ok(self.get_json(&["notifications"], &[]).await?)
    }

    /// `PATCH /v1/notifications/{id}/read`.
    pub async fn mark_notification_read(&self, id: &NotificationId) -> DataResult<()> {
        Ok(self
            .send_unit(Method::PATCH, &["notifications", id.as_str(), "read"])
            .await?)
    }

    /// `PATCH /v1/notifications/read-all`.
    pub async fn mark_all_notifications_read(&self) -> DataResult<()> {
        Ok(self
            .send_unit(Method::PATCH, &["notifications", "read-all"])
            .await?)
    }
}
