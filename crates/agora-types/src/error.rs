//! The closed error enumeration every remote call resolves to.

use thiserror::Error;

/// Domain error produced by every network-backed operation.
///
/// The set is closed: callers match on it exhaustively and never see a
/// transport error type directly.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataError {
    /// The device could not reach the server at all.
    #[error("No internet connection")]
    NoInternet,

    /// The bearer token is missing, expired, or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// The server refused the write because of conflicting state.
    #[error("Conflict")]
    Conflict,

    /// The server failed while handling the request.
    #[error("Internal server error")]
    InternalServerError,

    /// Anything the mapper could not classify.
    #[error("Unknown error")]
    UnknownError,

    /// Signup rejected: the username is already registered.
    #[error("Username already taken")]
    UsernameTaken,

    /// Signup rejected: the email is already registered.
    #[error("Email already taken")]
    EmailTaken,
}

impl DataError {
    /// Whether the caller should show a login affordance instead of a generic error.
    pub fn requires_login(&self) -> bool {
        matches!(self, DataError::Unauthorized)
    }

    /// Whether the failure is transient and a retry may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DataError::NoInternet | DataError::InternalServerError | DataError::UnknownError
        )
    }

    /// Short inline message suitable for a dismissible banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            DataError::NoInternet => "You're offline. Check your connection and try again.",
            DataError::Unauthorized => "Please log in to continue.",
            DataError::Conflict => "That change conflicts with the latest data.",
            DataError::InternalServerError => "Something went wrong on our side.",
            DataError::UnknownError => "Something went wrong.",
            DataError::UsernameTaken => "That username is already taken.",
            DataError::EmailTaken => "That email is already registered.",
        }
    }
}

/// Result type alias using DataError.
pub type DataResult<T> = Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unauthorized_requires_login() {
        assert!(DataError::Unauthorized.requires_login());
        for error in [
            DataError::NoInternet,
            DataError::Conflict,
            DataError::InternalServerError,
            DataError::UnknownError,
            DataError::UsernameTaken,
            DataError::EmailTaken,
        ] {
            assert!(!error.requires_login(), "{error:?}");
        }
    }

    #[test]
    fn transient_errors() {
        assert!(DataError::NoInternet.is_transient());
        assert!(DataError::InternalServerError.is_transient());
        assert!(!DataError::Conflict.is_transient());
        assert!(!DataError::UsernameTaken.is_transient());
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(DataError::NoInternet.to_string(), "No internet connection");
        assert_eq!(DataError::EmailTaken.to_string(), "Email already taken");
    }
}
