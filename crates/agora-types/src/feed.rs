//! Feed DTOs: posts, comments and communities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CommentId, CommunityId, PostId, UserId};
use crate::vote::VoteState;

/// A post as returned by `GET /v1/posts`.
///
/// `score` and `vote_state` are the server's values at fetch time; the cache
/// moves them into observable cells so votes can patch them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub author_id: UserId,
    pub author_username: String,
    pub community_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub vote_state: VoteState,
    #[serde(default)]
    pub comment_count: u32,
    pub created_at: DateTime<Utc>,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    pub author_id: UserId,
    pub author_username: String,
    pub content: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub vote_state: VoteState,
    pub created_at: DateTime<Utc>,
}

/// A community (subreddit-like grouping of posts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub member_count: u64,
}

/// Body of `POST /v1/posts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub community_name: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Body of `POST /v1/comments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub post_id: PostId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    pub content: String,
}
