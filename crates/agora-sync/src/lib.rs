//! # Agora sync
//!
//! The client-side data core: repositories that own caches, apply
//! optimistic mutations, and merge chat history with the live stream.
//!
//! ## Principles
//!
//! - **One writer per cache** - each [`Store`] belongs to one repository;
//!   everyone else reads through a [`StoreReader`]
//! - **Every remote call ends in one `DataError`** - nothing panics across a
//!   repository boundary
//! - **Votes roll back, friends resync** - a rejected vote applies the exact
//!   inverse; a friend action reloads the whole graph
//! - **History and live are kept apart** - the rendered chat is their
//!   deduplicated, ordered union
//!
//! ## Example
//!
//! ```rust,ignore
//! let services = SessionServices::from_config(&config, &paths)?;
//! services.session.login("ada", "secret").await?;
//! services.posts.refresh(None).await?;
//!
//! let entry = services.posts.posts().snapshot()[0].clone();
//! match services.posts.vote(&entry, VoteDirection::Upvote).await {
//!     VoteOutcome::Applied(_) => {}
//!     VoteOutcome::RolledBack(e) => show_banner(e.user_message()),
//!     VoteOutcome::LoginRequired => prompt_login(),
//!     VoteOutcome::Busy => {}
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - [`cell`] - Observable value cells
//! - [`store`] - Single-writer ordered caches
//! - [`scope`] - Cancellation scopes
//! - [`guard`] - Per-key in-flight guards
//! - [`vote`] - Optimistic vote engine
//! - [`remote`] - Network seams
//! - [`session`], [`feed`], [`friends`], [`chat`], [`reports`],
//!   [`notifications`] - Repositories
//! - [`services`] - The session container

pub mod cell;
pub mod chat;
mod error;
pub mod feed;
pub mod friends;
pub mod guard;
pub mod notifications;
pub mod remote;
pub mod reports;
pub mod scope;
pub mod services;
pub mod session;
pub mod store;
pub mod vote;

#[cfg(test)]
mod tests;

pub use cell::ObservableCell;
pub use chat::{merge_messages, parse_message, ChannelTimeline, ChatRepository};
pub use error::{SetupError, StorageError, StorageResult};
pub use feed::{CommentEntry, CommentRepository, CommunityRepository, PostEntry, PostRepository};
pub use friends::FriendRepository;
pub use guard::{InFlight, InFlightPermit};
pub use notifications::{NotificationEntry, NotificationRepository, ReadOutcome};
pub use reports::ReportRepository;
pub use scope::Scope;
pub use services::{Remote, SessionServices};
pub use session::{AuthState, FileTokenStore, MemoryTokenStore, SessionRepository, TokenStore};
pub use store::{Keyed, Store, StoreReader};
pub use vote::{Votable, VoteEngine, VoteOutcome};
