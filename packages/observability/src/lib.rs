//! Structured logging for the Agora client.
//!
//! Library crates only emit `tracing` events. The host calls
//! [`init_with_config`] once (normally through
//! `agora_config_and_utils::init_logging`) and every event becomes one JSON
//! line in `~/.agora/logs/client.jsonl`:
//!
//! ```text
//! tail -f ~/.agora/logs/client.jsonl | jq 'select(.level == "WARN")'
//! ```

mod json_layer;
mod writer;

use std::path::PathBuf;

use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use json_layer::{JsonLayer, LogLine};
pub use writer::{LogFile, LogFileWriter};

/// What the JSON layer keeps from each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObservabilityMode {
    /// All fields, message bodies included.
    #[default]
    DevVerbose,
    /// Ids, counters and outcome fields only.
    ProdMetadataOnly,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `service` on every line.
    pub service_name: String,
    /// Filter used when `RUST_LOG` is unset or invalid.
    pub default_level: String,
    /// `None` means `~/.agora/logs/client.jsonl`.
    pub log_path: Option<PathBuf>,
    /// Mirror events to stderr in compact text form.
    pub also_stderr: bool,
    pub mode: ObservabilityMode,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "agora".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
            mode: ObservabilityMode::default(),
        }
    }
}

impl LogConfig {
    fn resolved_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(|| {
            dirs::home_dir().map(|home| home.join(".agora/logs/client.jsonl"))
        })
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_level))
    }
}

/// Install the global subscriber.
///
/// An unopenable log file degrades to stderr output. Only the first call in
/// a process has any effect.
pub fn init_with_config(config: LogConfig) {
    let path = config.resolved_path();
    let file = match path.as_deref().map(LogFile::open) {
        Some(Ok(file)) => Some(file),
        Some(Err(e)) => {
            eprintln!("agora: cannot open log file {path:?}: {e}");
            None
        }
        None => None,
    };
    let stderr = config.also_stderr || file.is_none();

    let json = file.map(|file| {
        JsonLayer::new(config.service_name.as_str(), config.mode, file).with_filter(config.filter())
    });
    let text = stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(config.filter())
    });

    if tracing_subscriber::registry().with(json).with(text).try_init().is_ok() {
        debug!(service = %config.service_name, mode = ?config.mode, "Logging ready");
    }
}
