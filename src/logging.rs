// SPDX-License-Identifier: MIT
//
// Tracing subscriber initialization.
//
// The terminal is the display surface, so logs never go to stdout or
// stderr while the viewer runs. They go to a file instead; watch it with
// `tail -f` from another terminal. `RUST_LOG` wins over the configured
// level.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors from setting up the log file and subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory couldn't be created.
    #[error("failed to create log directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log path has no file name, or is a filesystem root.
    #[error("invalid log file path: {0}")]
    InvalidPath(PathBuf),

    /// The configured level isn't a valid filter directive.
    #[error("invalid log level {level:?}: {reason}")]
    InvalidLevel { level: String, reason: String },

    /// A global subscriber was already installed.
    #[error("tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Build the filter: `RUST_LOG` if set and valid, else `default_level`.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidLevel`] if `default_level` is needed
/// and doesn't parse.
pub fn filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return Ok(from_env);
    }
    EnvFilter::try_new(default_level).map_err(|e| LoggingError::InvalidLevel {
        level: default_level.to_owned(),
        reason: e.to_string(),
    })
}

/// Split `log_path` into the directory to create and the file name.
///
/// A bare file name has an empty parent, which means the current directory.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidPath`] for a root or a path ending in `..`.
pub fn split_log_path(log_path: &Path) -> Result<(&Path, &OsStr), LoggingError> {
    let invalid = || LoggingError::InvalidPath(log_path.to_path_buf());
    let directory = match log_path.parent().ok_or_else(invalid)? {
        p if p.as_os_str().is_empty() => Path::new("."),
        p => p,
    };
    let file_name = log_path.file_name().ok_or_else(invalid)?;
    Ok((directory, file_name))
}

/// Install a file-backed subscriber writing to `log_path`.
///
/// Creates the log directory if needed. A bare file name logs to the
/// current directory.
///
/// # Errors
///
/// See [`LoggingError`].
pub fn init(log_path: &Path, default_level: &str) -> Result<(), LoggingError> {
    let (directory, file_name) = split_log_path(log_path)?;

    std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.to_path_buf(),
        source,
    })?;

    let env_filter = filter(default_level)?;
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}
