// SPDX-License-Identifier: MIT
//
// Error type for the terminal engine.
//
// Every variant is fatal to the viewer: the binary's top-level handler
// restores the terminal, clears the screen and exits non-zero. Nothing
// in this crate retries.

use std::io;

use thiserror::Error;

/// Errors raised by terminal session, size resolution, input, and output.
#[derive(Debug, Error)]
pub enum Error {
    /// A termios attribute get/set call failed.
    ///
    /// `op` names the libc call (`tcgetattr` / `tcsetattr`) so the
    /// diagnostic reads like `perror` output.
    #[error("{op}: {source}")]
    TerminalConfiguration {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// A second raw session was requested while one is already installed.
    #[error("a raw terminal session is already active")]
    SessionActive,

    /// Neither the window-size query nor the cursor-position probe
    /// produced a usable viewport.
    #[error("could not determine window size: {0}")]
    ViewportResolution(String),

    /// Reading stdin failed for a reason other than "no data yet".
    #[error("read: {0}")]
    InputRead(#[source] io::Error),

    /// Writing a frame or control sequence to the display failed.
    #[error("write: {0}")]
    Output(#[source] io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
