//! The per-session service container.

use std::sync::Arc;

use agora_api::AgoraClient;
use agora_config_and_utils::{Config, Paths};
use agora_realtime::{RealtimeClient, RealtimeConfig};
use tracing::info;

use crate::chat::ChatRepository;
use crate::error::SetupError;
use crate::feed::{CommentRepository, CommunityRepository, PostRepository};
use crate::friends::FriendRepository;
use crate::notifications::NotificationRepository;
use crate::remote::{
    AuthRemote, ChatRemote, FeedRemote, FriendRemote, LiveTransport, NotificationRemote,
    ReportRemote,
};
use crate::reports::ReportRepository;
use crate::session::{AuthState, FileTokenStore, SessionRepository, TokenStore};

/// Everything a REST backend must provide.
pub trait Remote:
    AuthRemote + FeedRemote + FriendRemote + ChatRemote + ReportRemote + NotificationRemote + 'static
{
}

impl<T> Remote for T where
    T: AuthRemote
        + FeedRemote
        + FriendRemote
        + ChatRemote
        + ReportRemote
        + NotificationRemote
        + 'static
{
}

/// All repositories of one client session.
///
/// Created at startup, passed around by reference, and cleared on logout.
/// Each repository is the only writer of its caches.
pub struct SessionServices {
    pub session: SessionRepository,
    pub posts: PostRepository,
    pub comments: CommentRepository,
    pub communities: CommunityRepository,
    pub friends: FriendRepository,
    pub chat: ChatRepository,
    pub reports: ReportRepository,
    pub notifications: NotificationRepository,
}

impl SessionServices {
    pub fn new<R: Remote>(
        remote: Arc<R>,
        transport: Arc<dyn LiveTransport>,
        token_store: Arc<dyn TokenStore>,
        history_page_size: u32,
    ) -> Self {
        let session = SessionRepository::new(remote.clone(), token_store);
        let auth = session.auth();

        Self {
            posts: PostRepository::new(remote.clone(), auth.clone()),
            comments: CommentRepository::new(remote.clone(), auth.clone()),
            communities: CommunityRepository::new(remote.clone()),
            friends: FriendRepository::new(remote.clone(), auth.clone()),
            chat: ChatRepository::new(remote.clone(), transport, auth.clone(), history_page_size),
            reports: ReportRepository::new(remote.clone(), auth),
            notifications: NotificationRepository::new(remote),
            session,
        }
    }

    /// Wire the production clients from configuration.
    pub fn from_config(config: &Config, paths: &Paths) -> Result<Self, SetupError> {
        paths.ensure_dirs()?;
        let client = Arc::new(AgoraClient::from_config(config)?);
        let transport = Arc::new(RealtimeClient::new(RealtimeConfig::from_config(config)));
        let token_store = Arc::new(FileTokenStore::new(paths));

        info!(api_url = %config.api_url, "Session services ready");
        Ok(Self::new(
            client,
            transport,
            token_store,
            config.history_page_size,
        ))
    }

    pub fn auth(&self) -> AuthState {
        self.session.auth()
    }

    /// Drop every cache.
    pub fn clear(&self) {
        self.posts.clear();
        self.comments.clear();
        self.communities.clear();
        self.friends.clear();
        self.chat.clear();
        self.reports.clear();
        self.notifications.clear();
    }

    /// End the session: close the live stream, forget the token, clear
    /// every cache.
    pub async fn logout(&self) {
        self.chat.disconnect().await;
        self.session.logout().await;
        self.clear();
    }
}
