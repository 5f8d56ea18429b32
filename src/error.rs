// SPDX-License-Identifier: MIT
//
// Top-level error — everything that can end the process with status 1.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::LoggingError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Raw mode, sizing, input or output failed.
    #[error(transparent)]
    Term(#[from] t_term::Error),

    /// The file named on the command line couldn't be opened or read.
    #[error("{}: {source}", path.display())]
    FileLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// stdin isn't a terminal, so there is nothing to put in raw mode.
    #[error("stdin is not a terminal")]
    NotATerminal,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

impl AppError {
    /// Whether the terminal may have been drawn on, so the screen
    /// should be cleared before reporting.
    #[must_use]
    pub const fn touched_screen(&self) -> bool {
        matches!(self, Self::Term(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_load_names_the_path() {
        let err = AppError::FileLoad {
            path: PathBuf::from("/no/such/file.txt"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("/no/such/file.txt: "));
        assert!(!err.touched_screen());
    }

    #[test]
    fn term_errors_are_transparent() {
        let err = AppError::from(t_term::Error::SessionActive);
        assert_eq!(err.to_string(), t_term::Error::SessionActive.to_string());
        assert!(err.touched_screen());
    }

    #[test]
    fn not_a_terminal_leaves_screen_alone() {
        let err = AppError::NotATerminal;
        assert_eq!(err.to_string(), "stdin is not a terminal");
        assert!(!err.touched_screen());
    }

    #[test]
    fn config_errors_convert() {
        let err = AppError::from(ConfigError::ZeroTimeout);
        assert!(matches!(err, AppError::Config(_)));
        assert!(!err.touched_screen());
    }
}
