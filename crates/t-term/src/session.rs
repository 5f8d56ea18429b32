// SPDX-License-Identifier: MIT
//
// Raw-mode session — exclusive ownership of the terminal's line discipline.
//
// Safety: the panic hook calls `tcsetattr` on a raw fd. That is the only
// unsafe block here; everything else goes through the `Device` trait.
#![allow(unsafe_code)]
//
// A `RawSession` owns the device for as long as raw mode is installed.
// It captures the original termios once, installs the raw derivation,
// and puts the original back exactly once: on `restore()`, on drop, or
// from the panic hook, whichever comes first. A process-wide flag keeps
// a second session from stacking raw over raw and losing the real
// original attributes.
//
// The panic hook keeps its own copy of the original termios behind a
// Mutex. A panic mid-frame can't reach the session struct, but it can
// reach the global backup and restore the shell's line discipline before
// the panic message prints.

use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::terminal::Device;

/// Default raw-mode read timeout: one decisecond.
pub const DEFAULT_READ_TIMEOUT_DS: u8 = 1;

/// Set while a raw session is installed anywhere in the process.
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the original termios for panic recovery.
static TERMIOS_BACKUP: Mutex<Option<(RawFd, libc::termios)>> = Mutex::new(None);

/// The panic hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Restore termios from the global backup. Best-effort, ignores errors.
fn restore_termios_from_backup() {
    if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
        if let Some((fd, original)) = guard.take() {
            unsafe {
                let _ = libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const original);
            }
        }
    }
}

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal with no
/// echo and no line editing, and the panic message lands on a screen
/// that ignores `\n`.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_termios_from_backup();
            original(info);
        }));
    });
}

// ─── Raw attribute derivation ───────────────────────────────────────────────

/// Derive the raw attribute set from `original`.
///
/// Clears output post-processing, canonical input, echo, signal keys,
/// extended input processing, software flow control, CR→NL translation,
/// break-to-SIGINT, parity checking and 8th-bit stripping; forces 8-bit
/// characters. `VMIN = 0` with `VTIME = timeout_ds` makes every read
/// return after at most `timeout_ds` deciseconds, with zero bytes if
/// nothing arrived.
#[must_use]
pub fn make_raw(original: &libc::termios, timeout_ds: u8) -> libc::termios {
    let mut raw = *original;

    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag &= !libc::CSIZE;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = timeout_ds;

    raw
}

// ─── RawSession ─────────────────────────────────────────────────────────────

/// Raw-mode terminal session with RAII restore.
///
/// # Example
///
/// ```no_run
/// use t_term::session::RawSession;
/// use t_term::terminal::Tty;
///
/// let mut session = RawSession::enable(Tty::new(), 1)?;
/// // ... read keys from session.device_mut(), write frames to it ...
/// session.restore()?;
/// # Ok::<(), t_term::Error>(())
/// ```
pub struct RawSession<D: Device> {
    device: D,
    /// Captured before raw mode went in. `None` once restored.
    original: Option<libc::termios>,
    raw: libc::termios,
}

impl<D: Device> RawSession<D> {
    /// Capture the device's attributes and install raw mode.
    ///
    /// # Errors
    ///
    /// - [`Error::SessionActive`] if another session is installed.
    /// - [`Error::TerminalConfiguration`] if `tcgetattr` or `tcsetattr` fails.
    pub fn enable(mut device: D, timeout_ds: u8) -> Result<Self> {
        if SESSION_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::SessionActive);
        }

        let original = match device.attributes() {
            Ok(t) => t,
            Err(source) => {
                SESSION_ACTIVE.store(false, Ordering::Release);
                return Err(Error::TerminalConfiguration {
                    op: "tcgetattr",
                    source,
                });
            }
        };

        let raw = make_raw(&original, timeout_ds);

        if let Err(source) = device.set_attributes(&raw) {
            SESSION_ACTIVE.store(false, Ordering::Release);
            return Err(Error::TerminalConfiguration {
                op: "tcsetattr",
                source,
            });
        }

        if let Some(fd) = device.raw_fd() {
            install_panic_hook();
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some((fd, original));
            }
        }

        info!(timeout_ds, "raw mode enabled");

        Ok(Self {
            device,
            original: Some(original),
            raw,
        })
    }

    /// Reinstall the original attributes.
    ///
    /// Idempotent: only the first call touches the device. If the restore
    /// itself fails the session still counts as ended; retrying would
    /// just fail the same way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalConfiguration`] if `tcsetattr` fails.
    pub fn restore(&mut self) -> Result<()> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };

        if self.device.raw_fd().is_some() {
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
        }
        SESSION_ACTIVE.store(false, Ordering::Release);

        self.device
            .set_attributes(&original)
            .map_err(|source| Error::TerminalConfiguration {
                op: "tcsetattr",
                source,
            })?;

        debug!("original terminal attributes restored");
        Ok(())
    }

    /// Whether raw mode is still installed.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.original.is_some()
    }

    /// The attributes captured at enable time, until restored.
    #[inline]
    #[must_use]
    pub const fn original(&self) -> Option<&libc::termios> {
        self.original.as_ref()
    }

    /// The raw attribute set that was installed.
    #[inline]
    #[must_use]
    pub const fn raw(&self) -> &libc::termios {
        &self.raw
    }

    /// The underlying device.
    #[inline]
    #[must_use]
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// The underlying device, for reading keys and writing frames.
    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: Device> Drop for RawSession<D> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(error = %e, "failed to restore terminal on drop");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
