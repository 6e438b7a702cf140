//! Opaque string identifiers handed out by the server.
//!
//! Each entity kind gets its own newtype so a `PostId` can never be passed
//! where a `UserId` is expected.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Creates an identifier from an existing string.
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a post.
    PostId
);
string_id!(
    /// Identifier of a comment.
    CommentId
);
string_id!(
    /// Identifier of a community.
    CommunityId
);
string_id!(
    /// Identifier of a user account.
    UserId
);
string_id!(
    /// Identifier of a chat channel.
    ChannelId
);
string_id!(
    /// Identifier of a chat message.
    MessageId
);
string_id!(
    /// Identifier of a moderation report.
    ReportId
);
string_id!(
    /// Identifier of an in-app notification.
    NotificationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_transparently() {
        let id = PostId::from_string("p-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p-1\"");

        let parsed: UserId = serde_json::from_str("\"u-9\"").unwrap();
        assert_eq!(parsed.as_str(), "u-9");
    }

    #[test]
    fn ids_order_lexicographically() {
        let a = MessageId::from("a");
        let b = MessageId::from("b");
        assert!(a < b);
        assert_eq!(a.to_string(), "a");
    }
}
