// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns raw stdin bytes into logical keys. Ordinary bytes, control
// bytes included, pass through verbatim as `Key::Char`. ESC starts a
// small state machine that recognizes the legacy navigation sequences:
//
//   ESC [ A/B/C/D        arrows
//   ESC [ H / ESC [ F    Home / End
//   ESC O H / ESC O F    Home / End (SS3 form)
//   ESC [ <digit> ~      1/7 Home, 3 Delete, 4/8 End, 5 PageUp, 6 PageDown
//
// # Escape vs escape-sequence ambiguity
//
// A bare ESC byte could be the Escape key or the start of a sequence.
// Every follow-up read goes through the same bounded-wait primitive as
// the first byte (VTIME in raw mode), so a lone ESC, or any sequence cut
// short, decodes as `Key::Escape` after one read timeout instead of
// blocking. Anything unrecognized also collapses to `Key::Escape`.

use std::fmt;

use bitflags::bitflags;
use tracing::debug;

use crate::error::{Error, Result};
use crate::terminal::ByteSource;

const ESC: u8 = 0x1B;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A decoded logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any byte that isn't part of an escape sequence, verbatim.
    ///
    /// Control combinations arrive as their control byte: Ctrl+Q is
    /// `Char(0x11)`. Use [`Key::ctrl`] to spell them.
    Char(u8),
    /// A standalone Escape, or an escape sequence we don't recognize.
    Escape,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Editing ─────────────────────────────────────────────────
    Delete,
}

bitflags! {
    /// Modifier flags implied by a key's encoding.
    ///
    /// Legacy sequences carry no modifiers, so only control bytes report
    /// anything. Used when naming keys in logs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const CTRL = 0b0000_0100;
    }
}

impl Key {
    /// The key produced by holding Ctrl with `c`.
    ///
    /// Terminals send Ctrl+letter as the letter with the top three bits
    /// cleared, so `ctrl(b'q')` and `ctrl(b'Q')` are both `Char(0x11)`.
    #[inline]
    #[must_use]
    pub const fn ctrl(c: u8) -> Self {
        Self::Char(c & 0x1f)
    }

    /// Modifiers implied by the key's byte encoding.
    #[must_use]
    pub const fn modifiers(self) -> Modifiers {
        match self {
            Self::Char(0x00..=0x1A | 0x1C..=0x1F) => Modifiers::CTRL,
            _ => Modifiers::empty(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Char(b) if self.modifiers().contains(Modifiers::CTRL) => {
                write!(f, "Ctrl+{}", char::from(b | 0x40))
            }
            Self::Char(0x7F) => f.write_str("Backspace"),
            Self::Char(b @ 0x20..=0x7E) => write!(f, "'{}'", char::from(b)),
            Self::Char(b) => write!(f, "0x{b:02X}"),
            Self::Escape => f.write_str("Escape"),
            Self::Up => f.write_str("Up"),
            Self::Down => f.write_str("Down"),
            Self::Left => f.write_str("Left"),
            Self::Right => f.write_str("Right"),
            Self::Home => f.write_str("Home"),
            Self::End => f.write_str("End"),
            Self::PageUp => f.write_str("PageUp"),
            Self::PageDown => f.write_str("PageDown"),
            Self::Delete => f.write_str("Delete"),
        }
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Block until one logical key has been read.
///
/// Polls `source` until a byte arrives; each poll waits at most the
/// device's read timeout, so this never spins faster than that.
///
/// # Errors
///
/// Returns [`Error::InputRead`] if the first read fails for a reason
/// other than "no data yet".
pub fn read_key(source: &mut impl ByteSource) -> Result<Key> {
    let byte = loop {
        if let Some(b) = source.read_byte().map_err(Error::InputRead)? {
            break b;
        }
    };

    if byte == ESC {
        Ok(decode_escape(source))
    } else {
        Ok(Key::Char(byte))
    }
}

/// One bounded read for a sequence follow-up byte.
///
/// A timeout and a failure both mean the sequence is over; the next
/// `read_key` will run into a persistent failure and report it.
fn follow_byte(source: &mut impl ByteSource) -> Option<u8> {
    match source.read_byte() {
        Ok(b) => b,
        Err(e) => {
            debug!(error = %e, "read failed inside escape sequence");
            None
        }
    }
}

/// Decode what follows an ESC byte.
fn decode_escape(source: &mut impl ByteSource) -> Key {
    let Some(first) = follow_byte(source) else {
        return Key::Escape;
    };
    let Some(second) = follow_byte(source) else {
        return Key::Escape;
    };

    let key = match first {
        b'[' if second.is_ascii_digit() => match follow_byte(source) {
            Some(b'~') => tilde_key(second),
            _ => None,
        },
        b'[' => csi_key(second),
        b'O' => ss3_key(second),
        _ => None,
    };

    key.unwrap_or_else(|| {
        debug!(first, second, "unrecognized escape sequence");
        Key::Escape
    })
}

/// `ESC [ <digit> ~` editing keys.
const fn tilde_key(digit: u8) -> Option<Key> {
    match digit {
        b'1' | b'7' => Some(Key::Home),
        b'3' => Some(Key::Delete),
        b'4' | b'8' => Some(Key::End),
        b'5' => Some(Key::PageUp),
        b'6' => Some(Key::PageDown),
        _ => None,
    }
}

/// `ESC [ <letter>` cursor keys.
const fn csi_key(final_byte: u8) -> Option<Key> {
    match final_byte {
        b'A' => Some(Key::Up),
        b'B' => Some(Key::Down),
        b'C' => Some(Key::Right),
        b'D' => Some(Key::Left),
        b'H' => Some(Key::Home),
        b'F' => Some(Key::End),
        _ => None,
    }
}

/// `ESC O <letter>` keys.
const fn ss3_key(final_byte: u8) -> Option<Key> {
    match final_byte {
        b'H' => Some(Key::Home),
        b'F' => Some(Key::End),
        _ => None,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
