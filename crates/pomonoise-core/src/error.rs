//! Core error types for pomonoise-core.
//!
//! Every fallible operation in the library reports one of these. The
//! [`SessionCoordinator`](crate::SessionCoordinator) is the only place that
//! downgrades collaborator failures (audio, notification, log write) to
//! warnings; everything else propagates with `?`.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomonoise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Noise cache persistence errors
    #[error("Noise cache error: {0}")]
    Cache(#[from] CacheError),

    /// Audio output errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Notification errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Noise cache persistence errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// WAV encode/decode failed
    #[error("WAV error for {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// Persisted file exists but doesn't hold a buffer in the expected format
    #[error("Unexpected format in {path}: {message}")]
    Format { path: PathBuf, message: String },

    /// Cache directory could not be created
    #[error("Cannot create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Audio output errors.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No output device on the default host
    #[error("No audio output device available")]
    NoDevice,

    /// Device configuration could not be queried
    #[error("Failed to query output config: {0}")]
    Config(String),

    /// Stream could not be built
    #[error("Failed to build output stream: {0}")]
    Build(String),

    /// Stream could not be started
    #[error("Failed to start output stream: {0}")]
    Play(String),

    /// Device produces a sample format we don't write
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// Notification errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Notification backend rejected or failed to deliver the message
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AudioError::Build(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AudioError::Play(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        AudioError::Config(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_errors_render_with_context() {
        let err: CoreError = ConfigError::UnknownKey("audio.bogus".into()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown configuration key: audio.bogus"
        );

        let err: CoreError = AudioError::NoDevice.into();
        assert_eq!(err.to_string(), "Audio error: No audio output device available");
    }

    #[test]
    fn io_failures_surface_through_their_area() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CoreError = CacheError::CreateDir {
            path: PathBuf::from("/tmp/noise"),
            source: io,
        }
        .into();
        assert!(matches!(err, CoreError::Cache(CacheError::CreateDir { .. })));
        assert_eq!(
            err.to_string(),
            "Noise cache error: Cannot create cache directory /tmp/noise: denied"
        );
    }

    #[test]
    fn rusqlite_errors_map_to_query_failed() {
        let err: DatabaseError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }
}
