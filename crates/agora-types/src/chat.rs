//! Chat channels and messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, MessageId, UserId};

/// A chat channel (direct or group).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatChannel {
    pub id: ChannelId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<UserId>,
    #[serde(default)]
    pub moderators: Vec<UserId>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Author block embedded in every message and in `send_message` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSender {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A chat message, from either the history endpoint or a `new_message` push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    pub sender: MessageSender,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub media_urls: Vec<String>,
}

impl ChatMessage {
    /// Total ordering key: creation time, then id as tie-break.
    pub fn order_key(&self) -> (DateTime<Utc>, &MessageId) {
        (self.created_at, &self.id)
    }
}
