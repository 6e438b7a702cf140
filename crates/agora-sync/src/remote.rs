//! Seams between the repositories and the network.
//!
//! Repositories depend on these traits rather than on concrete clients so
//! they can be driven by fakes in tests. [`AgoraClient`] implements every
//! REST trait; [`RealtimeClient`] implements [`LiveTransport`].

use agora_api::{AgoraClient, ImageUpload, MessagePage};
use agora_realtime::{ConnectionState, RealtimeClient, RealtimeEvent, RealtimeResult};
use agora_types::{
    AuthToken, ChannelId, ChatChannel, ChatMessage, Comment, CommentId, Community, Credentials,
    DataResult, FriendGraph, MessageSender, NewComment, NewPost, NewReport, Notification,
    NotificationId, Post, PostId, Report, ReportId, SignupRequest, User, UserId,
    VerificationRequest, VoteState,
};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Authentication and profiles.
#[async_trait]
pub trait AuthRemote: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> DataResult<AuthToken>;
    async fn signup(&self, request: &SignupRequest) -> DataResult<()>;
    async fn verify(&self, request: &VerificationRequest) -> DataResult<()>;
    async fn current_user(&self) -> DataResult<User>;
    async fn user_profile(&self, username: &str) -> DataResult<User>;

    /// Install the bearer token on the transport.
    async fn set_token(&self, token: AuthToken);
    async fn clear_token(&self);
}

/// Posts, comments, communities and votes.
#[async_trait]
pub trait FeedRemote: Send + Sync {
    async fn posts(&self, community_name: Option<&str>) -> DataResult<Vec<Post>>;
    async fn post(&self, post_id: &PostId) -> DataResult<Post>;
    async fn create_post(&self, post: &NewPost) -> DataResult<Post>;
    async fn vote_post(&self, post_id: &PostId, state: VoteState) -> DataResult<()>;
    async fn comments(&self, post_id: &PostId) -> DataResult<Vec<Comment>>;
    async fn create_comment(&self, comment: &NewComment) -> DataResult<Comment>;
    async fn vote_comment(&self, comment_id: &CommentId, state: VoteState) -> DataResult<()>;
    async fn communities(&self) -> DataResult<Vec<Community>>;
    async fn community(&self, name: &str) -> DataResult<Community>;
}

/// Friend graph.
#[async_trait]
pub trait FriendRemote: Send + Sync {
    async fn friends(&self) -> DataResult<FriendGraph>;
    async fn send_friend_request(&self, user_id: &UserId) -> DataResult<()>;
    async fn accept_friend_request(&self, user_id: &UserId) -> DataResult<()>;
    async fn reject_friend_request(&self, user_id: &UserId) -> DataResult<()>;
    async fn remove_friend(&self, user_id: &UserId) -> DataResult<()>;
}

/// Chat REST surface.
#[async_trait]
pub trait ChatRemote: Send + Sync {
    async fn channels(&self) -> DataResult<Vec<ChatChannel>>;
    async fn direct_channel(&self, user_id: &UserId) -> DataResult<ChatChannel>;
    async fn channel_messages(
        &self,
        channel_id: &ChannelId,
        page: u32,
        limit: u32,
    ) -> DataResult<MessagePage>;
    async fn send_channel_message(
        &self,
        channel_id: &ChannelId,
        content: &str,
        media_urls: &[String],
    ) -> DataResult<ChatMessage>;
    async fn upload_images(&self, images: Vec<ImageUpload>) -> DataResult<Vec<String>>;
}

/// Moderation reports.
#[async_trait]
pub trait ReportRemote: Send + Sync {
    async fn create_report(&self, report: &NewReport) -> DataResult<Report>;
    async fn reports(&self) -> DataResult<Vec<Report>>;
    async fn resolve_report(&self, report_id: &ReportId) -> DataResult<()>;
}

/// Notifications.
#[async_trait]
pub trait NotificationRemote: Send + Sync {
    async fn register_push_token(&self, token: &str) -> DataResult<()>;
    async fn notifications(&self) -> DataResult<Vec<Notification>>;
    async fn mark_notification_read(&self, id: &NotificationId) -> DataResult<()>;
    async fn mark_all_notifications_read(&self) -> DataResult<()>;
}

/// The real-time channel as seen by the chat repository.
#[async_trait]
pub trait LiveTransport: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent>;
    async fn connect(&self, channel_id: &ChannelId) -> RealtimeResult<()>;
    async fn disconnect(&self);
    /// No socket open or opening.
    async fn is_idle(&self) -> bool;
    async fn send_message(
        &self,
        channel_id: &ChannelId,
        content: &str,
        sender: &MessageSender,
    ) -> RealtimeResult<()>;
}

// =============================================================================
// Production implementations
// =============================================================================

#[async_trait]
impl AuthRemote for AgoraClient {
    async fn login(&self, credentials: &Credentials) -> DataResult<AuthToken> {
        AgoraClient::login(self, credentials).await
    }

    async fn signup(&self, request: &SignupRequest) -> DataResult<()> {
        AgoraClient::signup(self, request).await
    }

    async fn verify(&self, request: &VerificationRequest) -> DataResult<()> {
        AgoraClient::verify(self, request).await
    }

    async fn current_user(&self) -> DataResult<User> {
        AgoraClient::current_user(self).await
    }

    async fn user_profile(&self, username: &str) -> DataResult<User> {
        AgoraClient::user_profile(self, username).await
    }

    async fn set_token(&self, token: AuthToken) {
        AgoraClient::set_token(self, token).await
    }

    async fn clear_token(&self) {
        AgoraClient::clear_token(self).await
    }
}

#[async_trait]
impl FeedRemote for AgoraClient {
    async fn posts(&self, community_name: Option<&str>) -> DataResult<Vec<Post>> {
        AgoraClient::posts(self, community_name).await
    }

    async fn post(&self, post_id: &PostId) -> DataResult<Post> {
        AgoraClient::post(self, post_id).await
    }

    async fn create_post(&self, post: &NewPost) -> DataResult<Post> {
        AgoraClient::create_post(self, post).await
    }

    async fn vote_post(&self, post_id: &PostId, state: VoteState) -> DataResult<()> {
        AgoraClient::vote_post(self, post_id, state).await
    }

    async fn comments(&self, post_id: &PostId) -> DataResult<Vec<Comment>> {
        AgoraClient::comments(self, post_id).await
    }

    async fn create_comment(&self, comment: &NewComment) -> DataResult<Comment> {
        AgoraClient::create_comment(self, comment).await
    }

    async fn vote_comment(&self, comment_id: &CommentId, state: VoteState) -> DataResult<()> {
        AgoraClient::vote_comment(self, comment_id, state).await
    }

    async fn communities(&self) -> DataResult<Vec<Community>> {
        AgoraClient::communities(self).await
    }

    async fn community(&self, name: &str) -> DataResult<Community> {
        AgoraClient::community(self, name).await
    }
}

#[async_trait]
impl FriendRemote for AgoraClient {
    async fn friends(&self) -> DataResult<FriendGraph> {
        AgoraClient::friends(self).await
    }

    async fn send_friend_request(&self, user_id: &UserId) -> DataResult<()> {
        AgoraClient::send_friend_request(self, user_id).await
    }

    async fn accept_friend_request(&self, user_id: &UserId) -> DataResult<()> {
        AgoraClient::accept_friend_request(self, user_id).await
    }

    async fn reject_friend_request(&self, user_id: &UserId) -> DataResult<()> {
        AgoraClient::reject_friend_request(self, user_id).await
    }

    async fn remove_friend(&self, user_id: &UserId) -> DataResult<()> {
        AgoraClient::remove_friend(self, user_id).await
    }
}

#[async_trait]
impl ChatRemote for AgoraClient {
    async fn channels(&self) -> DataResult<Vec<ChatChannel>> {
        AgoraClient::channels(self).await
    }

    async fn direct_channel(&self, user_id: &UserId) -> DataResult<ChatChannel> {
        AgoraClient::direct_channel(self, user_id).await
    }

    async fn channel_messages(
        &self,
        channel_id: &ChannelId,
        page: u32,
        limit: u32,
    ) -> DataResult<MessagePage> {
        AgoraClient::channel_messages(self, channel_id, page, limit).await
    }

    async fn send_channel_message(
        &self,
        channel_id: &ChannelId,
        content: &str,
        media_urls: &[String],
    ) -> DataResult<ChatMessage> {
        AgoraClient::send_channel_message(self, channel_id, content, media_urls).await
    }

    async fn upload_images(&self, images: Vec<ImageUpload>) -> DataResult<Vec<String>> {
        AgoraClient::upload_images(self, images).await
    }
}

#[async_trait]
impl ReportRemote for AgoraClient {
    async fn create_report(&self, report: &NewReport) -> DataResult<Report> {
        AgoraClient::create_report(self, report).await
    }

    async fn reports(&self) -> DataResult<Vec<Report>> {
        AgoraClient::reports(self).await
    }

    async fn resolve_report(&self, report_id: &ReportId) -> DataResult<()> {
        AgoraClient::resolve_report(self, report_id).await
    }
}

#[async_trait]
impl NotificationRemote for AgoraClient {
    async fn register_push_token(&self, token: &str) -> DataResult<()> {
        AgoraClient::register_push_token(self, token).await
    }

    async fn notifications(&self) -> DataResult<Vec<Notification>> {
        AgoraClient::notifications(self).await
    }

    async fn mark_notification_read(&self, id: &NotificationId) -> DataResult<()> {
        AgoraClient::mark_notification_read(self, id).await
    }

    async fn mark_all_notifications_read(&self) -> DataResult<()> {
        AgoraClient::mark_all_notifications_read(self).await
    }
}

#[async_trait]
impl LiveTransport for RealtimeClient {
    fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        RealtimeClient::subscribe(self)
    }

    async fn connect(&self, channel_id: &ChannelId) -> RealtimeResult<()> {
        RealtimeClient::connect(self, channel_id).await
    }

    async fn disconnect(&self) {
        RealtimeClient::disconnect(self).await
    }

    async fn is_idle(&self) -> bool {
        RealtimeClient::state(self).await == ConnectionState::Disconnected
    }

    async fn send_message(
        &self,
        channel_id: &ChannelId,
        content: &str,
        sender: &MessageSender,
    ) -> RealtimeResult<()> {
        RealtimeClient::send_message(self, channel_id, content, sender).await
    }
}
