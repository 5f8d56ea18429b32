// SPDX-License-Identifier: MIT
//
// Configuration — an optional TOML file under the user's config dir.
//
// Precedence, lowest to highest: built-in defaults, the config file,
// `RUST_LOG` (applied by the logging layer), command-line flags. Every
// field in the file is optional; unknown keys are rejected so a typo
// doesn't silently fall back to a default.
//
//   log_file = "/tmp/tilde.log"
//   log_level = "debug"
//   read_timeout_ds = 1

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use t_term::session::DEFAULT_READ_TIMEOUT_DS;

const APP_DIR: &str = "tilde";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "tilde.log";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from locating, reading or validating the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists (or was named explicitly) but couldn't be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file isn't valid TOML or doesn't match the schema.
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// `read_timeout_ds = 0` would turn every read into a busy poll.
    #[error("read_timeout_ds must be between 1 and 255 deciseconds")]
    ZeroTimeout,
}

/// The config file as written. Absent keys are `None`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Where tracing output goes.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Raw-mode read timeout (termios `VTIME`), in deciseconds.
    #[serde(default)]
    pub read_timeout_ds: Option<u8>,
}

/// Settings after defaults and overrides are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_file: PathBuf,
    pub log_level: String,
    pub read_timeout_ds: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: default_log_path(),
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            read_timeout_ds: DEFAULT_READ_TIMEOUT_DS,
        }
    }
}

impl Config {
    /// Merge defaults, the optional file, and the `--log-file` override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] if the file sets a zero timeout.
    pub fn resolve(
        file: Option<ConfigFile>,
        log_file_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(file) = file {
            if let Some(path) = file.log_file {
                config.log_file = path;
            }
            if let Some(level) = file.log_level {
                config.log_level = level;
            }
            if let Some(timeout) = file.read_timeout_ds {
                if timeout == 0 {
                    return Err(ConfigError::ZeroTimeout);
                }
                config.read_timeout_ds = timeout;
            }
        }

        if let Some(path) = log_file_override {
            config.log_file = path;
        }

        Ok(config)
    }
}

/// `<config dir>/tilde/config.toml`, when the platform has a config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

/// `<cache dir>/tilde/tilde.log`, or under the temp dir as a last resort.
#[must_use]
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join(LOG_FILE)
}

/// Load the config file.
///
/// An explicit path must exist. The default path is optional: if it
/// doesn't exist the result is `Ok(None)`.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
pub fn load(explicit: Option<&Path>) -> Result<Option<ConfigFile>, ConfigError> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(None),
        },
    };

    match fs::read_to_string(&path) {
        Ok(text) => parse(&text, &path).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound && !required => Ok(None),
        Err(source) => Err(ConfigError::Read { path, source }),
    }
}

/// Parse config text. `path` is only used for error messages.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for invalid TOML or unknown keys.
pub fn parse(text: &str, path: &Path) -> Result<ConfigFile, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn p() -> PathBuf {
        PathBuf::from("test.toml")
    }

    // ── parse ───────────────────────────────────────────────────────

    #[test]
    fn empty_file_is_all_none() {
        assert_eq!(parse("", &p()).unwrap(), ConfigFile::default());
    }

    #[test]
    fn all_fields() {
        let file = parse(
            "log_file = \"/tmp/x.log\"\nlog_level = \"debug\"\nread_timeout_ds = 3\n",
            &p(),
        )
        .unwrap();
        assert_eq!(
            file,
            ConfigFile {
                log_file: Some(PathBuf::from("/tmp/x.log")),
                log_level: Some("debug".into()),
                read_timeout_ds: Some(3),
            }
        );
    }

    #[test]
    fn unknown_key_rejected() {
        let err = parse("colour = \"red\"", &p()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn timeout_out_of_range_rejected() {
        assert!(parse("read_timeout_ds = 300", &p()).is_err());
    }

    #[test]
    fn invalid_toml_rejected() {
        assert!(parse("log_level = ", &p()).is_err());
    }

    // ── resolve ─────────────────────────────────────────────────────

    #[test]
    fn defaults_without_file() {
        let config = Config::resolve(None, None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.read_timeout_ds, 1);
        assert_eq!(config.log_level, "info");
        assert!(config.log_file.ends_with("tilde/tilde.log"));
    }

    #[test]
    fn file_overrides_defaults() {
        let file = ConfigFile {
            log_file: Some("/var/tmp/t.log".into()),
            log_level: Some("trace".into()),
            read_timeout_ds: Some(2),
        };
        let config = Config::resolve(Some(file), None).unwrap();
        assert_eq!(config.log_file, PathBuf::from("/var/tmp/t.log"));
        assert_eq!(config.log_level, "trace");
        assert_eq!(config.read_timeout_ds, 2);
    }

    #[test]
    fn cli_overrides_file() {
        let file = ConfigFile {
            log_file: Some("/from/file.log".into()),
            ..ConfigFile::default()
        };
        let config = Config::resolve(Some(file), Some("/from/cli.log".into())).unwrap();
        assert_eq!(config.log_file, PathBuf::from("/from/cli.log"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let file = ConfigFile {
            read_timeout_ds: Some(0),
            ..ConfigFile::default()
        };
        assert!(matches!(
            Config::resolve(Some(file), None),
            Err(ConfigError::ZeroTimeout)
        ));
    }

    // ── load ────────────────────────────────────────────────────────

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"warn\"").unwrap();
        let loaded = load(Some(file.path())).unwrap().unwrap();
        assert_eq!(loaded.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn explicit_invalid_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "nonsense").unwrap();
        let err = load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
    }

    #[test]
    fn default_paths_are_namespaced() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("tilde/config.toml"));
        }
        assert!(default_log_path().ends_with("tilde/tilde.log"));
    }
}
