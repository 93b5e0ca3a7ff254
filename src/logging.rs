//! Logging setup.
//!
//! One-shot commands log to stderr. The TUI logs to a file under the cache
//! directory (`~/.cache/ghpeek/logs/` on Linux) so log lines never land on
//! the alternate screen.

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Normalizes a log level name, falling back to the default for unknown values.
#[must_use]
pub fn parse_level(value: &str) -> String {
    match value.trim().to_lowercase().as_str() {
        "trace" => "trace".to_string(),
        "debug" => "debug".to_string(),
        "info" => "info".to_string(),
        "warn" | "warning" => "warn".to_string(),
        "error" => "error".to_string(),
        "off" | "none" | "disabled" => "off".to_string(),
        _ => DEFAULT_LOG_LEVEL.to_string(),
    }
}

/// `RUST_LOG` wins over the configured level.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(parse_level(level)))
}

/// Returns the log directory, if a cache directory can be determined.
#[must_use]
pub fn log_directory() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ghpeek").map(|dirs| dirs.cache_dir().join("logs"))
}

/// Initializes stderr logging for CLI commands.
pub fn init_stderr(level: &str) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    // A second init (e.g. in tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter(level))
        .with(layer)
        .try_init();
}

/// Initializes file logging for the TUI and returns the log file path.
///
/// # Errors
/// Returns error if the log directory or file cannot be created.
pub fn init_file(level: &str) -> io::Result<Option<PathBuf>> {
    if parse_level(level) == "off" {
        return Ok(None);
    }
    let Some(log_dir) = log_directory() else {
        return Ok(None);
    };
    fs::create_dir_all(&log_dir)?;

    let filename = format!(
        "ghpeek_{}.log",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = log_dir.join(filename);
    let log_file = File::create(&log_path)?;

    let layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter(level))
        .with(layer)
        .try_init();

    tracing::info!("Log file: {}", log_path.display());
    Ok(Some(log_path))
}
