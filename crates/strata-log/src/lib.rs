//! Structured logging for the strata voxel engine.
//!
//! Console output with uptime timestamps and module paths, plus JSON file
//! logging in debug builds. The level comes from `RUST_LOG` when set, else
//! from the `debug.log_level` config entry.

use std::path::{Path, PathBuf};

use strata_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config provide one.
const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "strata.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - enables the file layer
/// * `config` - optional configuration supplying the log level
///
/// ```no_run
/// use strata_config::Config;
/// use strata_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_string(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true) // mesh workers are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(path) = log_dir.and_then(prepare_log_file)
        && let Ok(log_file) = std::fs::File::create(path)
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Returns the default `EnvFilter`.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// Resolves the filter directive from config, falling back to the default.
fn filter_string(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.is_empty() => config.debug.log_level.clone(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Creates `log_dir` and returns the log file path inside it.
fn prepare_log_file(log_dir: &Path) -> Option<PathBuf> {
    std::fs::create_dir_all(log_dir).ok()?;
    Some(log_dir.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter = default_env_filter();
        assert!(format!("{filter}").contains("info"));
    }

    #[test]
    fn test_filter_string_from_config() {
        let mut config = Config::default();
        config.debug.log_level = "strata_stream=debug,warn".to_string();
        assert_eq!(filter_string(Some(&config)), "strata_stream=debug,warn");
    }

    #[test]
    fn test_empty_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level.clear();
        assert_eq!(filter_string(Some(&config)), DEFAULT_FILTER);
        assert_eq!(filter_string(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_env_filter_parsing() {
        let valid_filters = [
            "info",
            "debug,strata_mesh=trace",
            "warn,strata_stream=debug,strata_voxel=trace",
            "error",
        ];

        for filter_str in &valid_filters {
            let result = EnvFilter::try_from(*filter_str);
            assert!(result.is_ok(), "Failed to parse filter: {}", filter_str);
        }
    }

    #[test]
    fn test_prepare_log_file_creates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("logs").join("session");

        let path = prepare_log_file(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(path.file_name().unwrap(), LOG_FILE_NAME);
    }
}
