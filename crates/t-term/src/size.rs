// SPDX-License-Identifier: MIT
//
// Viewport size resolution.
//
// First choice is the device's own report (`TIOCGWINSZ`). Some terminals
// (serial consoles, a few emulators over odd transports) answer with a
// zero size. For those we fall back to asking the terminal itself: shove
// the cursor into the bottom-right corner with oversized relative moves,
// then request a cursor position report. The reply `ESC [ rows ; cols R`
// is the screen size.
//
// The fallback needs raw mode: in canonical mode the reply would sit in
// the line buffer until the user pressed Enter.

use tracing::{debug, info};

use crate::ansi;
use crate::error::{Error, Result};
use crate::terminal::{Device, Size};

/// Longest cursor position report we accept, terminator included.
const MAX_REPORT_LEN: usize = 31;

/// Determine the display's rows and columns.
///
/// # Errors
///
/// Returns [`Error::ViewportResolution`] if the window-size query gives
/// nothing usable and the cursor-position fallback fails, or
/// [`Error::Output`] if the probe can't be written.
pub fn resolve_size(device: &mut impl Device) -> Result<Size> {
    if let Some(size) = device.window_size() {
        info!(cols = size.cols, rows = size.rows, "window size from ioctl");
        return Ok(size);
    }

    debug!("window size query unusable, probing cursor position");
    let size = probe_size(device)?;
    info!(cols = size.cols, rows = size.rows, "window size from cursor probe");
    Ok(size)
}

/// Fallback: move to the far corner and ask where the cursor ended up.
fn probe_size(device: &mut impl Device) -> Result<Size> {
    let mut probe = Vec::with_capacity(16);
    ansi::cursor_to_far_corner(&mut probe).map_err(Error::Output)?;
    ansi::request_cursor_position(&mut probe).map_err(Error::Output)?;
    device.write_all(&probe).map_err(Error::Output)?;
    device.flush().map_err(Error::Output)?;

    let mut reply = Vec::with_capacity(MAX_REPORT_LEN);
    while reply.len() < MAX_REPORT_LEN {
        match device.read_byte() {
            Ok(Some(b'R')) => break,
            Ok(Some(b)) => reply.push(b),
            // Timed out or failed: parse whatever arrived.
            Ok(None) | Err(_) => break,
        }
    }

    let (rows, cols) = parse_cursor_report(&reply).ok_or_else(|| {
        Error::ViewportResolution(format!(
            "malformed cursor position report {:?}",
            String::from_utf8_lossy(&reply)
        ))
    })?;

    Size::new(cols, rows).ok_or_else(|| {
        Error::ViewportResolution(format!("terminal reported {rows}x{cols}"))
    })
}

/// Parse the body of a cursor position report: `ESC [ <rows> ; <cols>`.
///
/// The trailing `R` is expected to be stripped already. Returns
/// `(rows, cols)`, or `None` unless both integers are present.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<(u16, u16)> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let body = body.strip_suffix(b"R").unwrap_or(body);

    let sep = body.iter().position(|&b| b == b';')?;
    let rows = parse_decimal(&body[..sep])?;
    let cols = parse_decimal(&body[sep + 1..])?;
    Some((rows, cols))
}

fn parse_decimal(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
