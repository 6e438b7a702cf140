//! Configuration, file-system paths, and logging bootstrap for the Agora client.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_API_URL, DEFAULT_LOG_LEVEL, DEFAULT_REALTIME_URL};
pub use error::{CoreError, CoreResult};
pub use logging::{filter_directive, init_logging, SERVICE_NAME};
pub use paths::Paths;
