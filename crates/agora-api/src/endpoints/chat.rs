//! Chat channels, message history and media upload.

use agora_types::{ChannelId, ChatChannel, ChatMessage, DataResult, UserId};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::AgoraClient;

/// One image to upload through `POST /v1/chat/images`.
#[derive(Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A page of channel history.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DirectChannelBody<'a> {
    user_id: &'a UserId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageBody<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "no_media")]
    media_urls: &'a [String],
}

fn no_media(urls: &&[String]) -> bool {
    urls.is_empty()
}

#[derive(Deserialize)]
struct UploadResponse {
    urls: Vec<String>,
}

impl AgoraClient {
    /// `GET /v1/chat/channels`.
    pub async fn channels(&self) -> DataResult<Vec<ChatChannel>> {
        Ok(self.get_json(&["chat", "channels"], &[]).await?)
    }

    /// `POST /v1/chat/channels/direct`. Returns the existing channel when one
    /// is already open with `user_id`.
    pub async fn direct_channel(&self, user_id: &UserId) -> DataResult<ChatChannel> {
        let body = DirectChannelBody { user_id };
        Ok(self
            .send_json(Method::POST, &["chat", "channels", "direct"], &body)
            .await?)
    }

    /// `GET /v1/chat/channels/{id}/messages?page=&limit=`.
    pub async fn channel_messages(
        &self,
        channel_id: &ChannelId,
        page: u32,
        limit: u32,
    ) -> DataResult<MessagePage> {
        let page_param = page.to_string();
        let limit_param = limit.to_string();
        let page: MessagePage = self
            .get_json(
                &["chat", "channels", channel_id.as_str(), "messages"],
                &[("page", page_param.as_str()), ("limit", limit_param.as_str())],
            )
            .await?;
        debug!(
            channel_id = %channel_id,
            message_count = page.messages.len(),
            "Fetched channel history"
        );
        Ok(page)
    }

    /// `POST /v1/chat/channels/{id}/messages`.
    pub async fn send_channel_message(
        &self,
        channel_id: &ChannelId,
        content: &str,
        media_urls: &[String],
    ) -> DataResult<ChatMessage> {
        let body = SendMessageBody {
            content,
            media_urls,
        };
        Ok(self
            .send_json(
                Method::POST,
                &["chat", "channels", channel_id.as_str(), "messages"],
                &body,
            )
            .await?)
    }

    /// `POST /v1/chat/images`, one multipart `images` part per file.
    pub async fn upload_images(&self, images: Vec<ImageUpload>) -> DataResult<Vec<String>> {
        let count = images.len();
        let mut form = Form::new();
        for image in images {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime_type)
                .map_err(ApiError::from)?;
            form = form.part("images", part);
        }

        let response: UploadResponse = self.send_multipart(&["chat", "images"], form).await?;
        info!(image_count = count, "Uploaded chat images");
        Ok(response.urls)
    }
}
