// SPDX-License-Identifier: MIT
//
// Scripted stand-ins for the terminal, for tests in this crate and in
// crates that drive a `Device`.
//
// `ScriptedInput` replays a fixed byte script, then reports "no data yet"
// for a bounded number of polls before failing with `UnexpectedEof`. The
// failure keeps a test that forgot its quit key from spinning forever.
//
// `MockDevice` adds an in-memory termios, an optional window size, and a
// recorded output stream. Attribute calls can be made to fail.

use std::collections::VecDeque;
use std::io::{self, Write};

use crate::terminal::{ByteSource, Device, Size};

/// Idle polls tolerated after the script runs dry.
const DEFAULT_IDLE_POLLS: usize = 64;

/// Replays a byte script one byte per read.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    bytes: VecDeque<u8>,
    idle_polls: usize,
    idle_seen: usize,
}

impl ScriptedInput {
    /// Script the given bytes.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.iter().copied().collect(),
            idle_polls: DEFAULT_IDLE_POLLS,
            idle_seen: 0,
        }
    }

    /// Change how many empty polls are answered before failing.
    #[must_use]
    pub const fn with_idle_polls(mut self, polls: usize) -> Self {
        self.idle_polls = polls;
        self
    }

    /// Append more bytes to the script.
    pub fn push(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes.iter().copied());
    }

    /// Bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl ByteSource for ScriptedInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.bytes.pop_front() {
            self.idle_seen = 0;
            return Ok(Some(b));
        }
        if self.idle_seen >= self.idle_polls {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input script exhausted",
            ));
        }
        self.idle_seen += 1;
        Ok(None)
    }
}

/// An in-memory terminal.
#[derive(Debug)]
pub struct MockDevice {
    /// Scripted keyboard input.
    pub input: ScriptedInput,
    /// Everything written to the display, in order.
    pub output: Vec<u8>,
    /// Number of `write` calls that reached the device.
    pub writes: usize,
    /// Currently installed attributes.
    pub attrs: libc::termios,
    /// Window size reported by the size query.
    pub window: Option<Size>,
    /// Make `attributes` fail.
    pub fail_get: bool,
    /// Make `set_attributes` fail.
    pub fail_set: bool,
    /// Every attribute set installed, in order.
    pub installed: Vec<libc::termios>,
}

impl MockDevice {
    /// A device with cooked-mode-looking attributes and the given size.
    #[must_use]
    pub fn new(window: Option<Size>) -> Self {
        Self {
            input: ScriptedInput::new(&[]),
            output: Vec::new(),
            writes: 0,
            attrs: cooked_termios(),
            window,
            fail_get: false,
            fail_set: false,
            installed: Vec::new(),
        }
    }

    /// Replace the input script.
    #[must_use]
    pub fn with_input(mut self, bytes: &[u8]) -> Self {
        self.input = ScriptedInput::new(bytes);
        self
    }

    /// Output as lossy UTF-8, for readable assertions.
    #[must_use]
    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl ByteSource for MockDevice {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.input.read_byte()
    }
}

impl Write for MockDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Device for MockDevice {
    fn attributes(&self) -> io::Result<libc::termios> {
        if self.fail_get {
            return Err(io::Error::from_raw_os_error(libc::ENOTTY));
        }
        Ok(self.attrs)
    }

    fn set_attributes(&mut self, attrs: &libc::termios) -> io::Result<()> {
        if self.fail_set {
            return Err(io::Error::from_raw_os_error(libc::EIO));
        }
        self.attrs = *attrs;
        self.installed.push(*attrs);
        Ok(())
    }

    fn window_size(&self) -> Option<Size> {
        self.window
    }
}

/// A termios resembling a fresh interactive shell's line discipline.
#[must_use]
#[allow(unsafe_code)]
pub fn cooked_termios() -> libc::termios {
    // termios is plain old data; all-zero is a valid value.
    let mut t: libc::termios = unsafe { std::mem::zeroed() };
    t.c_iflag = libc::ICRNL | libc::IXON | libc::BRKINT | libc::INPCK | libc::ISTRIP;
    t.c_oflag = libc::OPOST | libc::ONLCR;
    t.c_cflag = libc::CS7 | libc::CREAD;
    t.c_lflag = libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN | libc::ECHOE;
    t.c_cc[libc::VMIN] = 1;
    t.c_cc[libc::VTIME] = 0;
    t
}
