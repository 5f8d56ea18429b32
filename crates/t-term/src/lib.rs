// SPDX-License-Identifier: MIT
//
// t-term — Terminal engine for tilde.
//
// Owns everything that touches the character device: the raw-mode
// session and its guaranteed restore, viewport size resolution with a
// cursor-probe fallback, the byte-level key decoder, the small ANSI
// subset the viewer speaks, and the frame buffer that turns a whole
// screen update into a single write.
//
// Like the rest of tilde this crate talks to the terminal through raw
// termios and hand-written escape sequences rather than a TUI framework.
// Every byte sent to the terminal is accounted for.

pub mod ansi;
pub mod error;
pub mod input;
pub mod output;
pub mod session;
pub mod size;
pub mod terminal;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Error, Result};
