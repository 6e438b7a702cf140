//! # Agora types
//!
//! The shared vocabulary of the Agora client core: identifiers, wire DTOs,
//! the vote state machine, and the closed [`DataError`] enumeration every
//! network-backed operation resolves to.
//!
//! ## Crate Structure
//!
//! - [`error`] - `DataError` / `DataResult`
//! - [`ids`] - Opaque string identifiers
//! - [`vote`] - `VoteState`, `VoteDirection`, and the transition table
//! - [`feed`] - Posts, comments, communities
//! - [`user`] - Users and authentication payloads
//! - [`chat`] - Channels and messages
//! - [`friend`] - Friend graph snapshot
//! - [`report`] - Moderation reports
//! - [`notification`] - In-app notifications

pub mod chat;
pub mod error;
pub mod feed;
pub mod friend;
pub mod ids;
pub mod notification;
pub mod report;
pub mod user;
pub mod vote;

pub use chat::{ChatChannel, ChatMessage, MessageSender};
pub use error::{DataError, DataResult};
pub use feed::{Comment, Community, NewComment, NewPost, Post};
pub use friend::{FriendGraph, FriendRequest};
pub use ids::{
    ChannelId, CommentId, CommunityId, MessageId, NotificationId, PostId, ReportId, UserId,
};
pub use notification::Notification;
pub use report::{NewReport, Report, ReportStatus, ReportTarget, ReportType};
pub use user::{AuthToken, Credentials, SignupRequest, User, VerificationRequest};
pub use vote::{VoteDirection, VoteState, VoteTransition};
