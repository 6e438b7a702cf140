//! Endpoint groups, one `impl AgoraClient` block per API area.

pub(crate) mod auth;
pub mod chat;
pub(crate) mod feed;
pub(crate) mod friends;
pub(crate) mod notifications;
pub(crate) mod reports;
