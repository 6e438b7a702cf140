//! Chat: channels, history, the live stream and their merged view.
//!
//! History and live messages are kept apart. History is replaced wholesale
//! on every reload; the live stream only ever grows. What the screen renders
//! is [`merge_messages`] over both, so reloading history and receiving
//! pushes can happen in any order.

use std::collections::HashMap;
use std::sync::Arc;

use agora_api::ImageUpload;
use agora_realtime::{RealtimeEvent, RealtimeResult, NEW_MESSAGE_EVENT};
use agora_types::{
    ChannelId, ChatChannel, ChatMessage, DataError, DataResult, MessageId, MessageSender, UserId,
};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::cell::ObservableCell;
use crate::remote::{ChatRemote, LiveTransport};
use crate::scope::Scope;
use crate::session::AuthState;
use crate::store::{Store, StoreReader};

/// Merge history and live messages into the rendered order.
///
/// Each id appears once. The first copy seen (history before live) keeps
/// its id, sender and timestamp; content and media come from the latest
/// copy. The result is sorted by `(created_at, id)`.
pub fn merge_messages(history: &[ChatMessage], live: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut merged: Vec<ChatMessage> = Vec::with_capacity(history.len() + live.len());
    let mut index: HashMap<&MessageId, usize> = HashMap::new();

    for message in history.iter().chain(live) {
        match index.get(&message.id) {
            Some(&position) => {
                let kept = &mut merged[position];
                kept.content.clone_from(&message.content);
                kept.media_urls.clone_from(&message.media_urls);
            }
            None => {
                index.insert(&message.id, merged.len());
                merged.push(message.clone());
            }
        }
    }

    merged.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
    merged
}

/// Parse a `new_message` payload.
pub fn parse_message(raw: &Value) -> Result<ChatMessage, serde_json::Error> {
    ChatMessage::deserialize(raw)
}

/// History and live stream of one channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelTimeline {
    history: ObservableCell<Arc<Vec<ChatMessage>>>,
    live: ObservableCell<Arc<Vec<ChatMessage>>>,
}

impl ChannelTimeline {
    pub fn history(&self) -> Arc<Vec<ChatMessage>> {
        self.history.get()
    }

    pub fn live(&self) -> Arc<Vec<ChatMessage>> {
        self.live.get()
    }

    /// History ∪ live, deduplicated and ordered.
    pub fn messages(&self) -> Vec<ChatMessage> {
        merge_messages(&self.history.get(), &self.live.get())
    }

    pub fn subscribe_history(&self) -> watch::Receiver<Arc<Vec<ChatMessage>>> {
        self.history.subscribe()
    }

    pub fn subscribe_live(&self) -> watch::Receiver<Arc<Vec<ChatMessage>>> {
        self.live.subscribe()
    }

    fn replace_history(&self, messages: Vec<ChatMessage>) {
        self.history.set(Arc::new(messages));
    }

    fn append_live(&self, message: ChatMessage) {
        self.live.update(|live| Arc::make_mut(live).push(message));
    }
}

type Timelines = Arc<Mutex<HashMap<ChannelId, ChannelTimeline>>>;

fn timeline_for(timelines: &Timelines, channel_id: &ChannelId) -> ChannelTimeline {
    timelines
        .lock()
        .entry(channel_id.clone())
        .or_default()
        .clone()
}

/// Owns chat channels and per-channel timelines.
pub struct ChatRepository {
    remote: Arc<dyn ChatRemote>,
    transport: Arc<dyn LiveTransport>,
    auth: AuthState,
    page_size: u32,
    channels: Store<ChatChannel>,
    timelines: Timelines,
    connected: ObservableCell<bool>,
    live_scope: Mutex<Option<Scope>>,
}

impl ChatRepository {
    pub fn new(
        remote: Arc<dyn ChatRemote>,
        transport: Arc<dyn LiveTransport>,
        auth: AuthState,
        page_size: u32,
    ) -> Self {
        Self {
            remote,
            transport,
            auth,
            page_size: page_size.max(1),
            channels: Store::new(),
            timelines: Arc::new(Mutex::new(HashMap::new())),
            connected: ObservableCell::new(false),
            live_scope: Mutex::new(None),
        }
    }

    pub fn channels(&self) -> StoreReader<ChatChannel> {
        self.channels.reader()
    }

    /// Timeline handle for `channel_id`, created empty on first use.
    pub fn timeline(&self, channel_id: &ChannelId) -> ChannelTimeline {
        timeline_for(&self.timelines, channel_id)
    }

    /// Merged view of one channel.
    pub fn messages(&self, channel_id: &ChannelId) -> Vec<ChatMessage> {
        self.timeline(channel_id).messages()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    pub fn connection_status(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    // =========================================================================
    // REST
    // =========================================================================

    /// Reload the channel list.
    pub async fn load_channels(&self) -> DataResult<()> {
        let channels = self.remote.channels().await.inspect_err(|e| {
            warn!(error = %e, "Channel list load failed");
        })?;
        debug!(channel_count = channels.len(), "Channels loaded");
        self.channels.replace_all(channels);
        Ok(())
    }

    /// Get or create the direct channel with `user_id`.
    pub async fn direct_channel(&self, user_id: &UserId) -> DataResult<ChatChannel> {
        self.auth.require()?;
        let channel = self.remote.direct_channel(user_id).await?;
        self.channels.upsert(channel.clone());
        Ok(channel)
    }

    /// Replace the channel's history with the first page from the server.
    ///
    /// On failure the previous history stays.
    pub async fn load_history(&self, channel_id: &ChannelId) -> DataResult<()> {
        let page = self
            .remote
            .channel_messages(channel_id, 1, self.page_size)
            .await
            .inspect_err(|e| {
                warn!(channel_id = %channel_id, error = %e, "History load failed");
            })?;
        debug!(
            channel_id = %channel_id,
            message_count = page.messages.len(),
            has_more = page.has_more,
            "History loaded"
        );
        self.timeline(channel_id).replace_history(page.messages);
        Ok(())
    }

    /// Upload images for a message; returns their URLs.
    pub async fn upload_images(&self, images: Vec<ImageUpload>) -> DataResult<Vec<String>> {
        self.auth.require()?;
        self.remote.upload_images(images).await
    }

    /// Send a message with attachments over REST.
    ///
    /// Nothing is inserted locally; the message shows up when the server
    /// pushes it back.
    pub async fn send_message_with_media(
        &self,
        channel_id: &ChannelId,
        content: &str,
        media_urls: &[String],
    ) -> DataResult<()> {
        self.auth.require()?;
        let message = self
            .remote
            .send_channel_message(channel_id, content, media_urls)
            .await?;
        debug!(channel_id = %channel_id, message_id = %message.id, "Message sent over REST");
        Ok(())
    }

    // =========================================================================
    // Live
    // =========================================================================

    /// Connect the live stream for `channel_id`.
    ///
    /// An existing stream is torn down first. Failures are logged and
    /// returned; nothing here retries.
    pub async fn connect(&self, channel_id: &ChannelId) -> RealtimeResult<()> {
        let previous = self.live_scope.lock().take();
        if let Some(previous) = previous {
            debug!(channel_id = %channel_id, "Replacing live stream");
            previous.cancel();
            self.transport.disconnect().await;
            self.connected.set(false);
        } else if !self.transport.is_idle().await {
            // A socket with no listener, e.g. an earlier connect that was
            // cancelled after the transport came up.
            warn!(channel_id = %channel_id, "Resetting orphaned live transport");
            self.transport.disconnect().await;
        }

        let events = self.transport.subscribe();
        if let Err(e) = self.transport.connect(channel_id).await {
            error!(channel_id = %channel_id, error = %e, "Live connection failed");
            return Err(e);
        }

        let scope = Scope::new();
        scope.spawn(listen(
            events,
            channel_id.clone(),
            Arc::clone(&self.timelines),
            self.connected.clone(),
        ));
        if let Some(previous) = self.live_scope.lock().replace(scope) {
            previous.cancel();
        }
        Ok(())
    }

    /// Feed one raw `new_message` payload into the live stream of
    /// `channel_id`. Malformed payloads are dropped.
    pub fn on_message(&self, channel_id: &ChannelId, raw: &Value) -> Option<ChatMessage> {
        ingest(&self.timelines, channel_id, raw)
    }

    /// Emit `send_message` for the logged-in user. Fire-and-forget: the
    /// message is not inserted locally.
    pub async fn send_message(&self, channel_id: &ChannelId, content: &str) -> DataResult<()> {
        let user = self.auth.require()?;
        let sender = MessageSender {
            id: user.id,
            username: user.username,
            avatar_url: user.avatar_url,
        };

        self.transport
            .send_message(channel_id, content, &sender)
            .await
            .map_err(|e| {
                warn!(channel_id = %channel_id, error = %e, "Live send failed");
                DataError::NoInternet
            })
    }

    /// Tear down the live stream. Safe to call repeatedly.
    pub async fn disconnect(&self) {
        if let Some(scope) = self.live_scope.lock().take() {
            scope.cancel();
        }
        self.transport.disconnect().await;
        self.connected.set(false);
    }

    /// Drop every cached channel and timeline.
    pub fn clear(&self) {
        self.channels.clear();
        self.timelines.lock().clear();
    }
}

fn ingest(timelines: &Timelines, channel_id: &ChannelId, raw: &Value) -> Option<ChatMessage> {
    let mut message = match parse_message(raw) {
        Ok(message) => message,
        Err(e) => {
            error!(channel_id = %channel_id, error = %e, "Dropping malformed chat message");
            return None;
        }
    };

    let target = message
        .channel_id
        .get_or_insert_with(|| channel_id.clone())
        .clone();
    debug!(channel_id = %target, message_id = %message.id, "Live message received");
    timeline_for(timelines, &target).append_live(message.clone());
    Some(message)
}

async fn listen(
    mut events: broadcast::Receiver<RealtimeEvent>,
    channel_id: ChannelId,
    timelines: Timelines,
    connected: ObservableCell<bool>,
) {
    loop {
        match events.recv().await {
            Ok(RealtimeEvent::Event { name, payload }) if name == NEW_MESSAGE_EVENT => {
                ingest(&timelines, &channel_id, &payload);
            }
            Ok(RealtimeEvent::Event { name, .. }) => {
                debug!(event = %name, "Ignoring realtime event");
            }
            Ok(RealtimeEvent::Connected) => {
                info!(channel_id = %channel_id, "Live stream joined");
                connected.set(true);
            }
            Ok(RealtimeEvent::Disconnected(reason)) => {
                info!(channel_id = %channel_id, reason = ?reason, "Live stream closed");
                connected.set(false);
                return;
            }
            Ok(RealtimeEvent::Error(message)) => {
                warn!(channel_id = %channel_id, error = %message, "Live stream error");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(channel_id = %channel_id, skipped_count = skipped, "Live stream lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                connected.set(false);
                return;
            }
        }
    }
}
