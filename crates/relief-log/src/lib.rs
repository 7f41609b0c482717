//! Structured logging for Relief.
//!
//! Console output through `tracing-subscriber` with uptime timestamps and
//! targets, plus a JSON log file in debug builds. `log` records emitted by
//! library crates (wgpu, the renderer, config loading) are forwarded into the
//! same subscriber.

use relief_config::Config;
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Name of the JSON log written in debug builds.
pub const LOG_FILE_NAME: &str = "relief.log";

/// Initialize the global tracing subscriber.
///
/// - `log_dir`: directory for the JSON log file (only used when `debug_build`).
/// - `config`: its `debug.log_level` replaces the default filter when non-empty.
///
/// `RUST_LOG` always wins over both. Returns `false` if a global subscriber
/// was already installed (e.g. by a test harness).
///
/// ```no_run
/// use relief_config::Config;
/// use relief_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), cfg!(debug_assertions), Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) -> bool {
    let directives = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build && let Some(log_file) = log_dir.and_then(open_log_file) {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();
        return subscriber.with(file_layer).try_init().is_ok();
    }

    subscriber.try_init().is_ok()
}

/// Resolve the filter directive string from an optional config.
pub fn filter_directives(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            let level = config.debug.log_level.trim();
            // A bare level keeps the GPU stack quiet; full directives pass through.
            if level.contains('=') || level.contains(',') {
                level.to_string()
            } else {
                format!("{level},wgpu=warn,naga=warn")
            }
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Create the JSON log file, returning `None` when the directory is unusable.
fn open_log_file(log_dir: &Path) -> Option<File> {
    std::fs::create_dir_all(log_dir).ok()?;
    File::create(log_dir.join(LOG_FILE_NAME)).ok()
}

/// An `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
