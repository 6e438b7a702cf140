//! Posts, comments, communities and votes.

use agora_types::{
    Comment, CommentId, Community, DataResult, NewComment, NewPost, Post, PostId, VoteState,
};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::AgoraClient;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoteBody {
    vote_state: VoteState,
}

impl AgoraClient {
    /// `GET /v1/posts[?communityName=]`.
    pub async fn posts(&self, community_name: Option<&str>) -> DataResult<Vec<Post>> {
        let query: Vec<(&str, &str)> = community_name
            .map(|name| vec![("communityName", name)])
            .unwrap_or_default();
        let posts: Vec<Post> = self.get_json(&["posts"], &query).await?;
        debug!(post_count = posts.len(), "Fetched posts");
        Ok(posts)
    }

    /// `GET /v1/posts?postId=`.
    pub async fn post(&self, post_id: &PostId) -> DataResult<Post> {
        Ok(self
            .get_json(&["posts"], &[("postId", post_id.as_str())])
            .await?)
    }

    /// `POST /v1/posts`.
    pub async fn create_post(&self, post: &NewPost) -> DataResult<Post> {
        Ok(self.send_json(Method::POST, &["posts"], post).await?)
    }

    /// `POST /v1/posts/{id}/votes` with the state after the toggle.
    pub async fn vote_post(&self, post_id: &PostId, state: VoteState) -> DataResult<()> {
        let body = VoteBody { vote_state: state };
        Ok(self
            .send_json_unit(Method::POST, &["posts", post_id.as_str(), "votes"], &body)
            .await?)
    }

    /// `GET /v1/comments?postId=`.
    pub async fn comments(&self, post_id: &PostId) -> DataResult<Vec<Comment>> {
        Ok(self
            .get_json(&["comments"], &[("postId", post_id.as_str())])
            .await?)
    }

    /// `POST /v1/comments`.
    pub async fn create_comment(&self, comment: &NewComment) -> DataResult<Comment> {
        Ok(self.send_json(Method::POST, &["comments"], comment).await?)
    }

    /// `POST /v1/comments/{id}/votes` with the state after the toggle.
    pub async fn vote_comment(&self, comment_id: &CommentId, state: VoteState) -> DataResult<()> {
        let body = VoteBody { vote_state: state };
        Ok(self
            .send_json_unit(
                Method::POST,
                &["comments", comment_id.as_str(), "votes"],
                &body,
            )
            .await?)
    }

    /// `GET /v1/communities`.
    pub async fn communities(&self) -> DataResult<Vec<Community>> {
        Ok(self.get_json(&["communities"], &[]).await?)
    }

    /// `GET /v1/communities/{name}`.
    pub async fn community(&self, name: &str) -> DataResult<Community> {
        Ok(self.get_json(&["communities", name], &[]).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_body_wire_format() {
        let body = VoteBody {
            vote_state: VoteState::Upvote,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"voteState":"UPVOTE"}"#
        );

        let cleared = VoteBody {
            vote_state: VoteState::None,
        };
        assert_eq!(
            serde_json::to_string(&cleared).unwrap(),
            r#"{"voteState":null}"#
        );
    }
}
