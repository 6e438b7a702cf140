//! Posts, comments and communities.

use std::sync::Arc;

use agora_types::{
    Comment, CommentId, Community, DataResult, NewComment, NewPost, Post, PostId, VoteDirection,
    VoteState,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cell::ObservableCell;
use crate::remote::FeedRemote;
use crate::session::AuthState;
use crate::store::{Keyed, Store, StoreReader};
use crate::vote::{Votable, VoteEngine, VoteOutcome};

/// A cached post: the fetched DTO plus its live vote cells.
#[derive(Debug, Clone)]
pub struct PostEntry {
    pub post: Post,
    pub score: ObservableCell<i64>,
    pub vote_state: ObservableCell<VoteState>,
}

impl From<Post> for PostEntry {
    fn from(post: Post) -> Self {
        Self {
            score: ObservableCell::new(post.score),
            vote_state: ObservableCell::new(post.vote_state),
            post,
        }
    }
}

impl Keyed for PostEntry {
    type Key = PostId;

    fn key(&self) -> &PostId {
        &self.post.id
    }
}

impl Votable for PostEntry {
    type Id = PostId;

    fn vote_id(&self) -> &PostId {
        &self.post.id
    }

    fn score(&self) -> &ObservableCell<i64> {
        &self.score
    }

    fn vote_state(&self) -> &ObservableCell<VoteState> {
        &self.vote_state
    }
}

/// A cached comment: the fetched DTO plus its live vote cells.
#[derive(Debug, Clone)]
pub struct CommentEntry {
    pub comment: Comment,
    pub score: ObservableCell<i64>,
    pub vote_state: ObservableCell<VoteState>,
}

impl From<Comment> for CommentEntry {
    fn from(comment: Comment) -> Self {
        Self {
            score: ObservableCell::new(comment.score),
            vote_state: ObservableCell::new(comment.vote_state),
            comment,
        }
    }
}

impl Keyed for CommentEntry {
    type Key = CommentId;

    fn key(&self) -> &CommentId {
        &self.comment.id
    }
}

impl Votable for CommentEntry {
    type Id = CommentId;

    fn vote_id(&self) -> &CommentId {
        &self.comment.id
    }

    fn score(&self) -> &ObservableCell<i64> {
        &self.score
    }

    fn vote_state(&self) -> &ObservableCell<VoteState> {
        &self.vote_state
    }
}

// =============================================================================
// Posts
// =============================================================================

/// Feed of posts, optionally filtered to one community.
pub struct PostRepository {
    remote: Arc<dyn FeedRemote>,
    auth: AuthState,
    posts: Store<PostEntry>,
    filter: Mutex<Option<String>>,
    votes: VoteEngine<PostId>,
}

impl PostRepository {
    pub fn new(remote: Arc<dyn FeedRemote>, auth: AuthState) -> Self {
        Self {
            remote,
            auth,
            posts: Store::new(),
            filter: Mutex::new(None),
            votes: VoteEngine::new(),
        }
    }

    pub fn posts(&self) -> StoreReader<PostEntry> {
        self.posts.reader()
    }

    pub fn get(&self, post_id: &PostId) -> Option<PostEntry> {
        self.posts.get(post_id)
    }

    /// Reload the feed. On failure the previous posts stay visible.
    pub async fn refresh(&self, community_name: Option<&str>) -> DataResult<()> {
        *self.filter.lock() = community_name.map(str::to_string);

        match self.remote.posts(community_name).await {
            Ok(posts) => {
                debug!(post_count = posts.len(), "Feed refreshed");
                self.posts
                    .replace_all(posts.into_iter().map(PostEntry::from).collect());
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Feed refresh failed, keeping cached posts");
                Err(e)
            }
        }
    }

    /// Fetch one post and upsert it.
    pub async fn load_post(&self, post_id: &PostId) -> DataResult<PostEntry> {
        let entry = PostEntry::from(self.remote.post(post_id).await?);
        self.posts.upsert(entry.clone());
        Ok(entry)
    }

    /// Publish a post, then reload the feed with the current filter.
    ///
    /// A failed reload is logged; the created post is still returned.
    pub async fn create_post(&self, post: &NewPost) -> DataResult<Post> {
        self.auth.require()?;
        let created = self.remote.create_post(post).await?;
        info!(post_id = %created.id, "Post created");

        let filter = self.filter.lock().clone();
        if let Err(e) = self.refresh(filter.as_deref()).await {
            warn!(error = %e, "Feed reload after post creation failed");
        }
        Ok(created)
    }

    /// Toggle a vote on a cached post.
    pub async fn vote(&self, entry: &PostEntry, direction: VoteDirection) -> VoteOutcome {
        let remote = Arc::clone(&self.remote);
        let post_id = entry.post.id.clone();
        self.votes
            .toggle(entry, direction, self.auth.is_authenticated(), |state| async move {
                remote.vote_post(&post_id, state).await
            })
            .await
    }

    pub fn clear(&self) {
        self.posts.clear();
        *self.filter.lock() = None;
    }
}

// =============================================================================
// Comments
// =============================================================================

/// Comments of the post currently on screen.
pub struct CommentRepository {
    remote: Arc<dyn FeedRemote>,
    auth: AuthState,
    comments: Store<CommentEntry>,
    votes: VoteEngine<CommentId>,
}

impl CommentRepository {
    pub fn new(remote: Arc<dyn FeedRemote>, auth: AuthState) -> Self {
        Self {
            remote,
            auth,
            comments: Store::new(),
            votes: VoteEngine::new(),
        }
    }

    pub fn comments(&self) -> StoreReader<CommentEntry> {
        self.comments.reader()
    }

    /// Load the comments of `post_id`, replacing the cache.
    pub async fn refresh(&self, post_id: &PostId) -> DataResult<()> {
        match self.remote.comments(post_id).await {
            Ok(comments) => {
                debug!(post_id = %post_id, comment_count = comments.len(), "Comments refreshed");
                self.comments
                    .replace_all(comments.into_iter().map(CommentEntry::from).collect());
                Ok(())
            }
            Err(e) => {
                warn!(post_id = %post_id, error = %e, "Comment refresh failed");
                Err(e)
            }
        }
    }

    /// Post a comment, then reload the thread.
    pub async fn create_comment(&self, comment: &NewComment) -> DataResult<Comment> {
        self.auth.require()?;
        let created = self.remote.create_comment(comment).await?;
        info!(comment_id = %created.id, post_id = %comment.post_id, "Comment created");

        if let Err(e) = self.refresh(&comment.post_id).await {
            warn!(error = %e, "Comment reload after creation failed");
        }
        Ok(created)
    }

    /// Toggle a vote on a cached comment.
    pub async fn vote(&self, entry: &CommentEntry, direction: VoteDirection) -> VoteOutcome {
        let remote = Arc::clone(&self.remote);
        let comment_id = entry.comment.id.clone();
        self.votes
            .toggle(entry, direction, self.auth.is_authenticated(), |state| async move {
                remote.vote_comment(&comment_id, state).await
            })
            .await
    }

    pub fn clear(&self) {
        self.comments.clear();
    }
}

// =============================================================================
// Communities
// =============================================================================

/// Known communities.
pub struct CommunityRepository {
    remote: Arc<dyn FeedRemote>,
    communities: Store<Community>,
}

impl CommunityRepository {
    pub fn new(remote: Arc<dyn FeedRemote>) -> Self {
        Self {
            remote,
            communities: Store::new(),
        }
    }

    pub fn communities(&self) -> StoreReader<Community> {
        self.communities.reader()
    }

    /// Reload the list. On failure the previous list stays visible.
    pub async fn refresh(&self) -> DataResult<()> {
        let communities = self.remote.communities().await.inspect_err(|e| {
            warn!(error = %e, "Community refresh failed, keeping cached list");
        })?;
        debug!(community_count = communities.len(), "Communities refreshed");
        self.communities.replace_all(communities);
        Ok(())
    }

    /// Fetch one community by name and upsert it.
    pub async fn load(&self, name: &str) -> DataResult<Community> {
        let community = self.remote.community(name).await?;
        self.communities.upsert(community.clone());
        Ok(community)
    }

    pub fn clear(&self) {
        self.communities.clear();
    }
}
