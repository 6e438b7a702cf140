//! The one place where transport errors become [`DataError`]s.
//!
//! | source | DataError |
//! |---|---|
//! | connect / timeout / request send failure | `NoInternet` |
//! | 401 | `Unauthorized` |
//! | 409 | `Conflict` |
//! | 500 | `InternalServerError` |
//! | any other status, undecodable body | `UnknownError` |

use agora_types::DataError;
use tracing::warn;

use crate::ApiError;

/// Maps an HTTP status code to the domain error enumeration.
pub fn from_status(status: u16) -> DataError {
    match status {
        401 => DataError::Unauthorized,
        409 => DataError::Conflict,
        500 => DataError::InternalServerError,
        _ => DataError::UnknownError,
    }
}

/// Maps any client error to the domain error enumeration.
pub fn map_error(error: &ApiError) -> DataError {
    match error {
        ApiError::Http(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
            DataError::NoInternet
        }
        ApiError::Http(e) => match e.status() {
            Some(status) => from_status(status.as_u16()),
            None => DataError::UnknownError,
        },
        ApiError::Status { status, .. } => from_status(*status),
        ApiError::Json(_) | ApiError::Config(_) => DataError::UnknownError,
    }
}

/// Signup refines `409 Conflict` into which field collided.
pub fn map_signup_error(error: &ApiError) -> DataError {
    match error {
        ApiError::Status {
            status: 409,
            message,
        } => {
            if message.to_ascii_lowercase().contains("email") {
                DataError::EmailTaken
            } else {
                DataError::UsernameTaken
            }
        }
        other => map_error(other),
    }
}

impl From<ApiError> for DataError {
    fn from(error: ApiError) -> Self {
        let mapped = map_error(&error);
        warn!(error = %error, mapped = ?mapped, "API request failed");
        mapped
    }
}
