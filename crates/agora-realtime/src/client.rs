//! Socket.IO client.

use crate::protocol::{self, EnginePacket, SocketPacket};
use crate::{RealtimeError, RealtimeResult};
use agora_config_and_utils::{Config, DEFAULT_REALTIME_URL};
use agora_types::{ChannelId, MessageSender};
use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsRead = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Client → server: subscribe to a channel's messages.
pub const JOIN_CHANNEL_EVENT: &str = "join_channel";
/// Client → server: post a message to a channel.
pub const SEND_MESSAGE_EVENT: &str = "send_message";
/// Server → client: a message was posted to a joined channel.
pub const NEW_MESSAGE_EVENT: &str = "new_message";

/// Realtime client configuration.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Socket.IO server URL (e.g., https://realtime.agora.social).
    pub url: String,
    /// Capacity of the event broadcast channel.
    pub event_buffer: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REALTIME_URL.to_string(),
            event_buffer: 100,
        }
    }
}

impl RealtimeConfig {
    /// Build from the loaded client configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            url: config.realtime_url.clone(),
            ..Default::default()
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Engine.IO open received, waiting for the Socket.IO connect ack.
    Handshaking,
    Connected,
}

/// Events emitted by the realtime client.
#[derive(Debug, Clone)]
pub enum RealtimeEvent {
    /// Socket.IO connect acknowledged; `join_channel` has been emitted.
    Connected,
    /// Connection closed, with a reason when known.
    Disconnected(Option<String>),
    /// A server event with its first argument.
    Event { name: String, payload: Value },
    /// Server-side or transport error.
    Error(String),
}

/// Socket.IO client bound to one chat channel at a time.
///
/// There is no automatic reconnection: once the connection drops the client
/// stays [`ConnectionState::Disconnected`] until `connect` is called again.
pub struct RealtimeClient {
    config: RealtimeConfig,
    state: Arc<RwLock<ConnectionState>>,
    channel: Arc<RwLock<Option<ChannelId>>>,
    sender: Arc<Mutex<Option<mpsc::Sender<Message>>>>,
    reader: Mutex<Option<JoinHandle<()>>>,
    event_tx: broadcast::Sender<RealtimeEvent>,
}

impl RealtimeClient {
    /// Create a new realtime client with the given configuration.
    pub fn new(config: RealtimeConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_buffer.max(1));

        Self {
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            channel: Arc::new(RwLock::new(None)),
            sender: Arc::new(Mutex::new(None)),
            reader: Mutex::new(None),
            event_tx,
        }
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RealtimeConfig::default())
    }

    /// Subscribe to realtime events.
    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.event_tx.subscribe()
    }

    /// Get the current connection state.
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Check if connected.
    pub async fn is_connected(&self) -> bool {
        *self.state.read().await == ConnectionState::Connected
    }

    /// Channel this connection joins on connect.
    pub async fn current_channel(&self) -> Option<ChannelId> {
        self.channel.read().await.clone()
    }

    /// Open the websocket and start the handshake.
    ///
    /// Returns once the websocket is open. `join_channel` is emitted when the
    /// server acknowledges the Socket.IO connect, followed by
    /// [`RealtimeEvent::Connected`]. A second call while a connection exists
    /// is a no-op.
    pub async fn connect(&self, channel_id: &ChannelId) -> RealtimeResult<()> {
        let attempt = {
            let mut state = self.state.write().await;
            if *state != ConnectionState::Disconnected {
                debug!(channel_id = %channel_id, "Already connecting or connected");
                return Ok(());
            }
            *state = ConnectionState::Connecting;
            ConnectAttempt::new(self.state.clone())
        };

        let url = protocol::socket_io_url(&self.config.url).inspect_err(|e| {
            error!(error = %e, "Cannot connect to realtime server");
        })?;

        info!(url = %url, channel_id = %channel_id, "Connecting to realtime server");

        let (ws_stream, _) = connect_async(url.as_str()).await.map_err(|e| {
            error!(error = %e, "Realtime connection failed");
            RealtimeError::from(e)
        })?;
        let (mut write, read) = ws_stream.split();

        // No await points past these locks.
        let (mut shared_sender, mut channel, mut reader_slot) = (
            self.sender.lock().await,
            self.channel.write().await,
            self.reader.lock().await,
        );

        let (msg_tx, mut msg_rx) = mpsc::channel::<Message>(100);
        *shared_sender = Some(msg_tx.clone());
        *channel = Some(channel_id.clone());

        // Closes the socket once every sender is gone
        let writer = tokio::spawn(async move {
            while let Some(msg) = msg_rx.recv().await {
                if write.send(msg).await.is_err() {
                    return;
                }
            }
            let _ = write.close().await;
        });

        let session = Session {
            channel_id: channel_id.clone(),
            state: self.state.clone(),
            channel: self.channel.clone(),
            shared_sender: self.sender.clone(),
            sender: msg_tx,
            event_tx: self.event_tx.clone(),
        };
        *reader_slot = Some(tokio::spawn(session.run(read, writer)));
        attempt.complete();

        Ok(())
    }

    /// Tear down the connection. Safe to call at any time, any number of
    /// times.
    pub async fn disconnect(&self) {
        let previous =
            std::mem::replace(&mut *self.state.write().await, ConnectionState::Disconnected);

        if let Some(reader) = self.reader.lock().await.take() {
            reader.abort();
        }

        if let Some(sender) = self.sender.lock().await.take() {
            if previous == ConnectionState::Connected {
                if let Ok(text) = protocol::encode(&SocketPacket::disconnect().into()) {
                    let _ = sender.try_send(Message::Text(text.into()));
                }
            }
        }

        *self.channel.write().await = None;

        if previous == ConnectionState::Disconnected {
            debug!("Realtime client already disconnected");
            return;
        }

        info!("Disconnected from realtime server");
        let _ = self
            .event_tx
            .send(RealtimeEvent::Disconnected(Some("client disconnect".to_string())));
    }

    /// Emit an event with one payload argument.
    pub async fn emit(&self, event: &str, payload: Value) -> RealtimeResult<()> {
        if !self.is_connected().await {
            return Err(RealtimeError::NotConnected);
        }

        let sender = self.sender.lock().await;
        let sender = sender.as_ref().ok_or(RealtimeError::NotConnected)?;
        send_packet(sender, SocketPacket::event(event, payload)).await
    }

    /// Emit `send_message`. The server echoes the message back as
    /// `new_message`; nothing is inserted locally.
    pub async fn send_message(
        &self,
        channel_id: &ChannelId,
        content: &str,
        sender: &MessageSender,
    ) -> RealtimeResult<()> {
        let payload = json!({
            "channelId": channel_id,
            "content": content,
            "sender": sender,
        });
        self.emit(SEND_MESSAGE_EVENT, payload).await
    }
}

impl Drop for RealtimeClient {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.get_mut().take() {
            reader.abort();
        }
    }
}

/// Returns the state to `Disconnected` unless the attempt completes,
/// including when the connect future is dropped mid-handshake.
struct ConnectAttempt {
    state: Option<Arc<RwLock<ConnectionState>>>,
}

impl ConnectAttempt {
    fn new(state: Arc<RwLock<ConnectionState>>) -> Self {
        Self { state: Some(state) }
    }

    fn complete(mut self) {
        self.state = None;
    }
}

impl Drop for ConnectAttempt {
    fn drop(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        fn reset(state: &mut ConnectionState) {
            if *state == ConnectionState::Connecting {
                *state = ConnectionState::Disconnected;
            }
        }

        if let Ok(mut guard) = state.try_write() {
            reset(&mut guard);
            return;
        }
        // Contended: finish the reset on the runtime.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move { reset(&mut *state.write().await) });
        }
    }
}

async fn send_packet(sender: &mpsc::Sender<Message>, packet: SocketPacket) -> RealtimeResult<()> {
    let text = protocol::encode(&packet.into())?;
    sender
        .send(Message::Text(text.into()))
        .await
        .map_err(|e| RealtimeError::Send(e.to_string()))
}

/// State owned by the reader task of one connection.
struct Session {
    channel_id: ChannelId,
    state: Arc<RwLock<ConnectionState>>,
    channel: Arc<RwLock<Option<ChannelId>>>,
    shared_sender: Arc<Mutex<Option<mpsc::Sender<Message>>>>,
    sender: mpsc::Sender<Message>,
    event_tx: broadcast::Sender<RealtimeEvent>,
}

impl Session {
    async fn run(self, mut read: WsRead, writer: JoinHandle<()>) {
        let mut reason = None;

        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => match protocol::decode(text.as_str()) {
                    Ok(packet) => {
                        if let Err(close_reason) = self.handle_packet(packet).await {
                            reason = close_reason;
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Dropping malformed realtime frame");
                    }
                },
                Ok(Message::Close(_)) => {
                    info!("Realtime connection closed by server");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "WebSocket error");
                    reason = Some(e.to_string());
                    break;
                }
            }
        }

        // Cleanup
        writer.abort();
        *self.shared_sender.lock().await = None;
        *self.state.write().await = ConnectionState::Disconnected;
        *self.channel.write().await = None;

        let _ = self.event_tx.send(RealtimeEvent::Disconnected(reason));
    }

    /// Handle one packet. `Err` ends the connection with an optional reason.
    async fn handle_packet(&self, packet: EnginePacket) -> Result<(), Option<String>> {
        match packet {
            EnginePacket::Open(handshake) => {
                debug!(
                    sid = %handshake.sid,
                    ping_interval = handshake.ping_interval,
                    "Engine.IO handshake received"
                );
                *self.state.write().await = ConnectionState::Handshaking;
                self.send(SocketPacket::connect()).await
            }
            EnginePacket::Ping => self.send_raw(EnginePacket::Pong).await,
            EnginePacket::Close => Err(Some("server closed the session".to_string())),
            EnginePacket::Message(SocketPacket::Connect { .. }) => {
                *self.state.write().await = ConnectionState::Connected;
                info!(channel_id = %self.channel_id, "Connected to realtime server");

                self.send(SocketPacket::event(
                    JOIN_CHANNEL_EVENT,
                    json!({ "channelId": self.channel_id }),
                ))
                .await?;
                let _ = self.event_tx.send(RealtimeEvent::Connected);
                Ok(())
            }
            EnginePacket::Message(SocketPacket::Event { name, args, .. }) => {
                debug!(event = %name, "Realtime event received");
                let payload = args.into_iter().next().unwrap_or(Value::Null);
                let _ = self.event_tx.send(RealtimeEvent::Event { name, payload });
                Ok(())
            }
            EnginePacket::Message(SocketPacket::ConnectError { data, .. }) => {
                let message = data
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| data.to_string());
                error!(error = %message, "Realtime connect rejected");
                let _ = self.event_tx.send(RealtimeEvent::Error(message.clone()));
                Err(Some(message))
            }
            EnginePacket::Message(SocketPacket::Disconnect { .. }) => {
                Err(Some("server disconnected the socket".to_string()))
            }
            other => {
                debug!(packet = ?other, "Ignoring realtime packet");
                Ok(())
            }
        }
    }

    async fn send(&self, packet: SocketPacket) -> Result<(), Option<String>> {
        self.send_raw(packet.into()).await
    }

    async fn send_raw(&self, packet: EnginePacket) -> Result<(), Option<String>> {
        let text = protocol::encode(&packet).map_err(|e| Some(e.to_string()))?;
        self.sender
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| Some(e.to_string()))
    }
}
