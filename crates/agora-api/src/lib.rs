//! REST client for the Agora API.
//!
//! [`AgoraClient`] covers every endpoint the client core consumes. Public
//! methods return [`agora_types::DataResult`]; transport failures are turned
//! into the domain error enumeration in exactly one place,
//! [`error_mapper`].

mod client;
mod endpoints;
mod error;
pub mod error_mapper;

pub use client::AgoraClient;
pub use endpoints::chat::{ImageUpload, MessagePage};
pub use error::{ApiError, ApiResult};
