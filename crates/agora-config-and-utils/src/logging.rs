//! Logging bootstrap.
//!
//! The host app calls [`init_logging`] once, before building any service.
//! Everything else logs through plain `tracing` macros.

use observability::{LogConfig, ObservabilityMode};

use crate::{Config, Paths};

/// `service` value on every log line written by the client core.
pub const SERVICE_NAME: &str = "agora-client";

/// `dev` (default) keeps every field and mirrors to stderr; `prod` keeps
/// only ids, counters and status fields.
const MODE_VAR: &str = "AGORA_OBS_MODE";

/// Install the global subscriber from the loaded configuration.
///
/// `RUST_LOG` still wins over `config.log_level`. Lines go to
/// [`Paths::log_file`].
///
/// ```ignore
/// let paths = Paths::new()?;
/// let config = Config::load(&paths)?;
/// init_logging(&config, &paths);
/// ```
pub fn init_logging(config: &Config, paths: &Paths) {
    let mode = mode_from(std::env::var(MODE_VAR).ok().as_deref());

    observability::init_with_config(LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: filter_directive(&config.log_level).into(),
        log_path: Some(paths.log_file()),
        also_stderr: mode == ObservabilityMode::DevVerbose,
        mode,
    });
}

fn mode_from(value: Option<&str>) -> ObservabilityMode {
    match value.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("prod") || v.eq_ignore_ascii_case("production") => {
            ObservabilityMode::ProdMetadataOnly
        }
        _ => ObservabilityMode::DevVerbose,
    }
}

/// Level name as an `EnvFilter` directive. Unknown names fall back to
/// `info`.
pub fn filter_directive(level: &str) -> &'static str {
    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

    let level = level.trim();
    if level.eq_ignore_ascii_case("warning") {
        return "warn";
    }
    LEVELS
        .into_iter()
        .find(|known| known.eq_ignore_ascii_case(level))
        .unwrap_or("info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_are_case_insensitive() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive(" Warn "), "warn");
        assert_eq!(filter_directive("warning"), "warn");
        assert_eq!(filter_directive("error"), "error");
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(filter_directive(""), "info");
        assert_eq!(filter_directive("verbose"), "info");
    }

    #[test]
    fn mode_defaults_to_dev() {
        assert_eq!(mode_from(None), ObservabilityMode::DevVerbose);
        assert_eq!(mode_from(Some("staging")), ObservabilityMode::DevVerbose);
        assert_eq!(mode_from(Some("PROD")), ObservabilityMode::ProdMetadataOnly);
        assert_eq!(
            mode_from(Some("production")),
            ObservabilityMode::ProdMetadataOnly
        );
    }
}
