//! Real-time transport for Agora chat.
//!
//! This crate provides:
//! - A Socket.IO v4 client over the Engine.IO v4 websocket transport
//! - Engine.IO ping/pong answered by the transport
//! - Connection state and a broadcast stream of server events
//!
//! Reconnection is deliberately left to the caller: a dropped connection
//! ends in [`RealtimeEvent::Disconnected`] and stays down.

mod client;
mod error;
pub mod protocol;

pub use client::{
    ConnectionState, RealtimeClient, RealtimeConfig, RealtimeEvent, JOIN_CHANNEL_EVENT,
    NEW_MESSAGE_EVENT, SEND_MESSAGE_EVENT,
};
pub use error::{RealtimeError, RealtimeResult};
