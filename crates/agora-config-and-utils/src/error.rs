use thiserror::Error;

/// Failures loading configuration or touching `~/.agora`.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot resolve client directory: {0}")]
    Path(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("malformed config file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
