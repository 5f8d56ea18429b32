// SPDX-License-Identifier: MIT
//
// Terminal device access — the raw fd layer everything else sits on.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd reads/writes. These
// are the standard POSIX interfaces for terminal control; there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// The rest of the crate never touches a file descriptor directly. It talks
// to two traits:
//
//   ByteSource: one bounded-wait byte read. `Ok(None)` means the read
//   timed out with nothing available (VMIN=0/VTIME>0 in raw mode), which
//   is not an error.
//
//   Device: a ByteSource that is also the display (`Write`) and owns the
//   termios attributes and the window size.
//
// `Tty` is the real device: input and attributes on stdin, output and
// window size on stdout. Output goes straight to fd 1 with `write(2)`,
// bypassing Rust's line-buffered stdout so a frame containing `\r\n`
// pairs is not split at the first newline.

use std::io::{self, Write};
use std::os::unix::io::RawFd;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// Build a size, rejecting zero in either dimension.
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Option<Self> {
        if cols == 0 || rows == 0 {
            None
        } else {
            Some(Self { cols, rows })
        }
    }
}

// ─── Traits ─────────────────────────────────────────────────────────────────

/// A source of input bytes with a bounded wait per read.
pub trait ByteSource {
    /// Read a single byte.
    ///
    /// Returns `Ok(None)` when no byte arrived within the device's read
    /// timeout. Any `Err` is a genuine read failure.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error for failures other than "no data
    /// yet" (`EAGAIN`, `EINTR`, or a zero-length read).
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// An interactive character device: input, display, line discipline.
pub trait Device: ByteSource + Write {
    /// Current termios attribute set.
    ///
    /// # Errors
    ///
    /// Returns the OS error if `tcgetattr` fails.
    fn attributes(&self) -> io::Result<libc::termios>;

    /// Install an attribute set, discarding pending input (`TCSAFLUSH`).
    ///
    /// # Errors
    ///
    /// Returns the OS error if `tcsetattr` fails.
    fn set_attributes(&mut self, attrs: &libc::termios) -> io::Result<()>;

    /// The window size as reported by the device, if it reports one.
    fn window_size(&self) -> Option<Size>;

    /// The fd whose attributes this device controls, when it is a real
    /// terminal. Used to restore termios from the panic hook.
    fn raw_fd(&self) -> Option<RawFd> {
        None
    }
}

impl<B: ByteSource + ?Sized> ByteSource for &mut B {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

// ─── Tty ────────────────────────────────────────────────────────────────────

/// The process's controlling terminal: stdin for input, stdout for output.
#[derive(Debug)]
pub struct Tty {
    input: RawFd,
    output: RawFd,
}

impl Tty {
    /// Handle on stdin/stdout. Opens nothing; the fds belong to the process.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: libc::STDIN_FILENO,
            output: libc::STDOUT_FILENO,
        }
    }

    /// Whether stdin is connected to a terminal.
    #[must_use]
    pub fn is_tty(&self) -> bool {
        unsafe { libc::isatty(self.input) != 0 }
    }
}

impl Default for Tty {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSource for Tty {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(self.input, (&raw mut byte).cast::<libc::c_void>(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }
}

impl Write for Tty {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(self.output, buf.as_ptr().cast::<libc::c_void>(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Unbuffered: every write() already reached the fd.
        Ok(())
    }
}

impl Device for Tty {
    fn attributes(&self) -> io::Result<libc::termios> {
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(self.input, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(termios)
        }
    }

    fn set_attributes(&mut self, attrs: &libc::termios) -> io::Result<()> {
        unsafe {
            if libc::tcsetattr(self.input, libc::TCSAFLUSH, attrs) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    fn window_size(&self) -> Option<Size> {
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        let result = unsafe { libc::ioctl(self.output, libc::TIOCGWINSZ, &raw mut ws) };

        if result == 0 {
            Size::new(ws.ws_col, ws.ws_row)
        } else {
            None
        }
    }

    fn raw_fd(&self) -> Option<RawFd> {
        Some(self.input)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
