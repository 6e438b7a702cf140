//! Scenario tests for the repositories, driven by in-memory fakes.
//!
//! - `harness.rs`       - FakeRemote, FakeTransport and DTO builders
//! - `vote.rs`          - Optimistic vote toggling and rollback
//! - `feed.rs`          - Feed, comment and community caches
//! - `friends.rs`       - Friend actions and full-graph resync
//! - `chat.rs`          - History, live stream and their merge
//! - `reports.rs`       - Report filing and resolution
//! - `notifications.rs` - Optimistic read flags
//! - `session.rs`       - Login, restore and logout
//! - `scope.rs`         - Cancellation of background work

mod feed;
mod notifications;
mod scope;
mod session;
