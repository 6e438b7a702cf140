//! Feed, comment and community caches.

use agora_types::{DataError, NewComment, NewPost, PostId, VoteState};

use super::harness::{comment, community, post, TestHarness};

fn post_ids(harness: &TestHarness) -> Vec<String> {
    harness
        .services
        .posts
        .posts()
        .snapshot()
        .iter()
        .map(|entry| entry.post.id.to_string())
        .collect()
}

#[tokio::test]
async fn refresh_filters_by_community() {
    let harness = TestHarness::new();
    {
        let mut state = harness.remote.state.lock();
        let mut other = post("p2", 1, VoteState::None);
        other.community_name = "golang".to_string();
        state.posts = vec![post("p1", 1, VoteState::None), other];
    }

    harness.services.posts.refresh(Some("golang")).await.unwrap();
    assert_eq!(post_ids(&harness), vec!["p2"]);

    harness.services.posts.refresh(None).await.unwrap();
    assert_eq!(post_ids(&harness), vec!["p1", "p2"]);
}

#[tokio::test]
async fn failed_refresh_keeps_cached_posts() {
    let harness = TestHarness::new();
    harness.remote.state.lock().posts = vec![post("p1", 1, VoteState::None)];
    harness.services.posts.refresh(None).await.unwrap();

    harness.remote.fail_next("posts", DataError::NoInternet);
    let result = harness.services.posts.refresh(None).await;

    assert_eq!(result, Err(DataError::NoInternet));
    assert_eq!(post_ids(&harness), vec!["p1"]);
}

#[tokio::test]
async fn create_post_requires_login() {
    let harness = TestHarness::new();
    let new_post = NewPost {
        community_name: "rust".to_string(),
        title: "Hello".to_string(),
        content: String::new(),
        image_url: None,
    };

    let result = harness.services.posts.create_post(&new_post).await;

    assert_eq!(result, Err(DataError::Unauthorized));
    assert_eq!(harness.remote.call_count("create_post"), 0);
}

#[tokio::test]
async fn create_post_reloads_with_current_filter() {
    let harness = TestHarness::logged_in().await;
    harness.services.posts.refresh(Some("rust")).await.unwrap();
    assert!(post_ids(&harness).is_empty());

    let new_post = NewPost {
        community_name: "rust".to_string(),
        title: "Hello".to_string(),
        content: String::new(),
        image_url: None,
    };
    let created = harness.services.posts.create_post(&new_post).await.unwrap();

    assert_eq!(created.title, "Hello");
    assert_eq!(post_ids(&harness), vec![created.id.to_string()]);
    assert_eq!(harness.remote.call_count("posts"), 2);
}

#[tokio::test]
async fn create_post_survives_failed_reload() {
    let harness = TestHarness::logged_in().await;
    harness.remote.fail_next("posts", DataError::InternalServerError);

    let new_post = NewPost {
        community_name: "rust".to_string(),
        title: "Hello".to_string(),
        content: String::new(),
        image_url: None,
    };
    let created = harness.services.posts.create_post(&new_post).await;

    assert!(created.is_ok());
    assert!(post_ids(&harness).is_empty());
}

#[tokio::test]
async fn load_post_upserts_into_feed() {
    let harness = TestHarness::new();
    harness.remote.state.lock().posts = vec![post("p1", 4, VoteState::None)];
    harness.services.posts.refresh(None).await.unwrap();

    harness.remote.state.lock().posts[0].score = 9;
    let entry = harness
        .services
        .posts
        .load_post(&PostId::from("p1"))
        .await
        .unwrap();

    assert_eq!(entry.score.get(), 9);
    assert_eq!(post_ids(&harness), vec!["p1"]);
    let cached = harness.services.posts.get(&PostId::from("p1")).unwrap();
    assert_eq!(cached.score.get(), 9);
}

#[tokio::test]
async fn create_comment_reloads_thread() {
    let harness = TestHarness::logged_in().await;
    harness.remote.state.lock().comments = vec![comment("c1", "p1", 0)];
    let post_id = PostId::from("p1");
    harness.services.comments.refresh(&post_id).await.unwrap();

    let created = harness
        .services
        .comments
        .create_comment(&NewComment {
            post_id: post_id.clone(),
            parent_id: None,
            content: "first!".to_string(),
        })
        .await
        .unwrap();

    let reader = harness.services.comments.comments();
    assert_eq!(reader.len(), 2);
    assert_eq!(reader.get(&created.id).unwrap().comment.content, "first!");
}

#[tokio::test]
async fn communities_refresh_and_load() {
    let harness = TestHarness::new();
    harness.remote.state.lock().communities = vec![community("rust")];

    harness.services.communities.refresh().await.unwrap();
    let loaded = harness.services.communities.load("golang").await.unwrap();

    let reader = harness.services.communities.communities();
    assert_eq!(reader.len(), 2);
    assert_eq!(reader.get(&loaded.id), Some(loaded));

    harness.remote.fail_next("communities", DataError::NoInternet);
    assert!(harness.services.communities.refresh().await.is_err());
    assert_eq!(reader.len(), 2);
}
