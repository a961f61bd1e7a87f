mod config;
pub mod worklog;

pub use config::{AudioConfig, Config, LogConfig, TimerConfig};
pub use worklog::{LogEntry, LogRecord, LogWriter, WorkLog, DEFAULT_TASK_NAME};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/pomonoise[-dev]/` based on POMONOISE_ENV.
///
/// Set POMONOISE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMONOISE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomonoise-dev")
    } else {
        base_dir.join("pomonoise")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
