// SPDX-License-Identifier: MIT
//
// Frame buffering.
//
// A frame is composed entirely in memory and handed to the display in one
// `write_all`, so the terminal never shows half a frame: no cursor flying
// around while rows are drawn, no torn lines. The buffer keeps its
// allocation between frames; `flush_to` clears the length only.

use std::io::{self, Write};

/// Initial capacity: a full 80x24 screen of text plus escapes fits
/// without reallocating.
const DEFAULT_CAPACITY: usize = 4096;

/// Byte buffer for one composed frame.
#[derive(Debug)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Discard the contents, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write the whole frame to `w` in one transaction and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails. The buffer is cleared
    /// either way; a failed frame is not retried.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        let result = if self.buf.is_empty() {
            Ok(())
        } else {
            w.write_all(&self.buf).and_then(|()| w.flush())
        };
        self.buf.clear();
        result
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for FrameBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
