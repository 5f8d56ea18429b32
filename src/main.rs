// SPDX-License-Identifier: MIT
//
// tilde — a raw-mode terminal text viewer.
//
// This is the main binary that wires together the two library crates:
//
//   t-term   → raw session, window size, key decoding, frame output
//   t-editor → document rows, cursor, frame composition
//
// Startup order:
//
//   args → config → logging → load file → raw mode → size → loop
//
// The file is loaded before raw mode goes in, so a missing file is
// reported on a terminal that was never touched. Once raw mode is on,
// the Editor owns the session; every exit path restores the terminal
// before anything is printed.

mod config;
mod editor;
mod error;
mod logging;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use t_editor::document::Document;
use t_term::terminal::Tty;

use crate::config::Config;
use crate::editor::Editor;
use crate::error::AppError;

/// A raw-mode terminal text viewer.
#[derive(Parser, Debug)]
#[command(name = "tilde", version, about)]
struct Args {
    /// File to display. Without one the screen shows only `~` markers.
    file: Option<PathBuf>,

    /// Config file to use instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs here instead of the configured log file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// Read `path` into a document, one row per line.
fn load_document(path: &Path) -> Result<Document, AppError> {
    let file_load = |source: std::io::Error| AppError::FileLoad {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(file_load)?;
    Document::from_reader(BufReader::new(file)).map_err(file_load)
}

fn run(args: Args) -> Result<(), AppError> {
    let file = config::load(args.config.as_deref())?;
    let config = Config::resolve(file, args.log_file)?;
    logging::init(&config.log_file, &config.log_level)?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let doc = match &args.file {
        Some(path) => load_document(path)?,
        None => Document::new(),
    };

    let tty = Tty::new();
    if !tty.is_tty() {
        return Err(AppError::NotATerminal);
    }

    let mut editor = Editor::open(tty, doc, config.read_timeout_ds)?;
    editor.run()?;
    Ok(())
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The editor has been dropped by now, so the terminal is back
            // in cooked mode.
            if e.touched_screen() {
                let _ = editor::clear(&mut std::io::stdout());
            }
            error!(error = %e, "fatal");
            eprintln!("tilde: {e}");
            ExitCode::FAILURE
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    // ── Args ──────────────────────────────────────────────────────────────

    #[test]
    fn no_arguments() {
        let args = Args::try_parse_from(["tilde"]).unwrap();
        assert_eq!(args.file, None);
        assert_eq!(args.config, None);
        assert_eq!(args.log_file, None);
    }

    #[test]
    fn file_argument() {
        let args = Args::try_parse_from(["tilde", "notes.txt"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("notes.txt")));
    }

    #[test]
    fn all_flags() {
        let args = Args::try_parse_from([
            "tilde",
            "--config",
            "/etc/tilde.toml",
            "--log-file",
            "/tmp/t.log",
            "a.txt",
        ])
        .unwrap();
        assert_eq!(args.file, Some(PathBuf::from("a.txt")));
        assert_eq!(args.config, Some(PathBuf::from("/etc/tilde.toml")));
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/t.log")));
    }

    #[test]
    fn two_files_rejected() {
        assert!(Args::try_parse_from(["tilde", "a", "b"]).is_err());
    }

    #[test]
    fn unknown_flag_rejected() {
        assert!(Args::try_parse_from(["tilde", "--colour"]).is_err());
    }

    // ── load_document ─────────────────────────────────────────────────────

    #[test]
    fn loads_every_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"one\r\ntwo\n\nfour").unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.row(0).unwrap().as_bytes(), b"one");
        assert_eq!(doc.row(1).unwrap().as_bytes(), b"two");
        assert!(doc.row(2).unwrap().is_empty());
        assert_eq!(doc.row(3).unwrap().as_bytes(), b"four");
    }

    #[test]
    fn empty_file_is_empty_document() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let doc = load_document(file.path()).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn missing_file_is_file_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, AppError::FileLoad { .. }));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn directory_is_file_load_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_document(dir.path()),
            Err(AppError::FileLoad { .. })
        ));
    }
}
