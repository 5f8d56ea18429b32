// SPDX-License-Identifier: MIT
//
// Editor — owns the raw session and drives the refresh/read/dispatch loop.
//
// Each iteration:
//
//   render(doc, cursor, size) → FrameBuffer → one write to the device
//   read_key(device)          → handle_key → cursor mutation or quit
//
// The session is held for the editor's whole lifetime. Quitting clears
// the screen and restores the terminal explicitly; any error that unwinds
// out of `run` drops the editor, and the session's Drop restores the
// terminal on that path too.

use std::io::{self, Write};

use tracing::{debug, info, trace};

use t_editor::cursor::{Cursor, Direction};
use t_editor::document::Document;
use t_editor::view;
use t_term::ansi;
use t_term::input::{self, Key};
use t_term::output::FrameBuffer;
use t_term::session::RawSession;
use t_term::size::resolve_size;
use t_term::terminal::{Device, Size};
use t_term::{Error, Result};

/// The key that ends the session.
pub const QUIT_KEY: Key = Key::ctrl(b'q');

/// What the loop should do after a key is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Lifecycle of the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Terminated,
}

/// Viewer state for one raw session: document, cursor and frame.
pub struct Editor<D: Device> {
    session: RawSession<D>,
    doc: Document,
    cursor: Cursor,
    size: Size,
    frame: FrameBuffer,
    state: State,
}

impl<D: Device> Editor<D> {
    /// Put `device` in raw mode and measure the viewport.
    ///
    /// The size probe needs raw mode (the cursor report is read byte by
    /// byte), so the session is enabled first. If sizing fails the
    /// session is dropped here and the terminal is restored.
    ///
    /// # Errors
    ///
    /// Session setup errors and [`Error::ViewportResolution`].
    pub fn open(device: D, doc: Document, read_timeout_ds: u8) -> Result<Self> {
        let mut session = RawSession::enable(device, read_timeout_ds)?;
        let size = resolve_size(session.device_mut())?;

        info!(cols = size.cols, rows = size.rows, lines = doc.len(), "viewer started");

        Ok(Self {
            session,
            doc,
            cursor: Cursor::new(),
            size,
            frame: FrameBuffer::new(),
            state: State::Running,
        })
    }

    /// Refresh, read a key, dispatch; until the quit key.
    ///
    /// # Errors
    ///
    /// [`Error::Output`] if a frame can't be written, [`Error::InputRead`]
    /// if the device can't be read, or a restore failure on quit.
    pub fn run(&mut self) -> Result<()> {
        while self.state == State::Running {
            self.refresh_screen()?;
            let key = input::read_key(self.session.device_mut())?;
            trace!(%key, modifiers = ?key.modifiers(), "key");
            if self.handle_key(key) == Action::Quit {
                self.terminate()?;
            }
        }
        Ok(())
    }

    /// Compose the frame and write it to the device in one piece.
    ///
    /// # Errors
    ///
    /// [`Error::Output`] on a write failure.
    pub fn refresh_screen(&mut self) -> Result<()> {
        self.frame.clear();
        view::render(&self.doc, self.cursor, self.size, &mut self.frame).map_err(Error::Output)?;
        self.frame
            .flush_to(self.session.device_mut())
            .map_err(Error::Output)
    }

    /// Apply one key to the cursor. Unmapped keys are ignored.
    pub fn handle_key(&mut self, key: Key) -> Action {
        let size = self.size;
        match key {
            QUIT_KEY => return Action::Quit,
            Key::Up => self.cursor.move_cursor(Direction::Up, size),
            Key::Down => self.cursor.move_cursor(Direction::Down, size),
            Key::Left => self.cursor.move_cursor(Direction::Left, size),
            Key::Right => self.cursor.move_cursor(Direction::Right, size),
            Key::Home => self.cursor.home(),
            Key::End => self.cursor.end(size),
            Key::PageUp => self.cursor.page(Direction::Up, size),
            Key::PageDown => self.cursor.page(Direction::Down, size),
            other => trace!(key = %other, "unmapped key ignored"),
        }
        Action::Continue
    }

    /// Clear the screen, home the cursor, restore the terminal.
    ///
    /// # Errors
    ///
    /// [`Error::Output`] if the clear can't be written, or a restore failure.
    pub fn terminate(&mut self) -> Result<()> {
        self.state = State::Terminated;

        clear(self.session.device_mut()).map_err(Error::Output)?;

        self.session.restore()?;
        debug!("viewer terminated");
        Ok(())
    }
}

/// `ESC[2J ESC[H`, flushed.
///
/// # Errors
///
/// Propagates write errors from `w`.
pub fn clear(w: &mut impl Write) -> io::Result<()> {
    ansi::clear_screen(w)?;
    ansi::cursor_home(w)?;
    w.flush()
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use t_term::testing::{MockDevice, cooked_termios};

    const SIZE: Size = Size { cols: 80, rows: 24 };
    const CTRL_Q: u8 = 0x11;

    fn device(input: &[u8]) -> MockDevice {
        MockDevice::new(Some(SIZE)).with_input(input)
    }

    fn editor(input: &[u8]) -> Editor<MockDevice> {
        Editor::open(device(input), Document::new(), 1).unwrap()
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .filter(|w| *w == needle)
            .count()
    }

    // ── startup ─────────────────────────────────────────────────────

    #[test]
    #[serial(raw_session)]
    fn open_uses_window_size() {
        let e = editor(&[]);
        assert_eq!(e.size, SIZE);
        assert_eq!(e.state, State::Running);
        assert!(e.session.is_active());
        assert_eq!(e.session.device().writes, 0);
    }

    #[test]
    #[serial(raw_session)]
    fn open_probes_when_window_size_unknown() {
        let dev = MockDevice::new(None).with_input(b"\x1b[50;132R");
        let e = Editor::open(dev, Document::new(), 1).unwrap();
        assert_eq!(e.size, Size { cols: 132, rows: 50 });
        assert!(e.session.device().output.ends_with(b"\x1b[999C\x1b[999B\x1b[6n"));
    }

    #[test]
    #[serial(raw_session)]
    fn failed_probe_restores_terminal() {
        let dev = MockDevice::new(None).with_input(b"garbage");
        let err = Editor::open(dev, Document::new(), 1).err().unwrap();
        assert!(matches!(err, Error::ViewportResolution(_)));

        // The session was released, so a new one can start.
        let e = editor(&[]);
        assert!(e.session.is_active());
    }

    // ── main loop ───────────────────────────────────────────────────

    #[test]
    #[serial(raw_session)]
    fn quit_right_after_startup() {
        let mut e = editor(&[CTRL_Q]);
        e.run().unwrap();

        assert_eq!(e.state, State::Terminated);
        assert!(!e.session.is_active());
        let dev = e.session.device();
        assert_eq!(dev.attrs, cooked_termios());
        assert!(dev.output.ends_with(b"\x1b[2J\x1b[H"));
        // One frame, then the clear.
        assert_eq!(count(&dev.output, b"\x1b[?25l"), 1);
    }

    #[test]
    #[serial(raw_session)]
    fn first_frame_is_tildes_and_home_cursor() {
        let mut e = editor(&[CTRL_Q]);
        e.run().unwrap();

        let out = &e.session.device().output;
        assert_eq!(count(out, b"~\x1b[K"), 24);
        assert_eq!(count(out, b"\x1b[1;1H"), 1);
    }

    #[test]
    #[serial(raw_session)]
    fn one_write_per_frame() {
        // Three keys then quit: four frames.
        let mut e = editor(&[b'j', b'k', b'x', CTRL_Q]);
        e.run().unwrap();

        let dev = e.session.device();
        assert_eq!(count(&dev.output, b"\x1b[?25l"), 4);
        // Four frame writes plus the two quit sequences.
        assert_eq!(dev.writes, 6);
    }

    #[test]
    #[serial(raw_session)]
    fn arrows_move_the_cursor_between_frames() {
        let mut e = editor(b"\x1b[B\x1b[B\x1b[C\x11");
        e.run().unwrap();

        assert_eq!((e.cursor.cx(), e.cursor.cy()), (1, 2));
        let out = e.session.device().output_str();
        assert!(out.contains("\x1b[2;1H"));
        assert!(out.contains("\x1b[3;1H"));
        assert!(out.contains("\x1b[3;2H"));
    }

    #[test]
    #[serial(raw_session)]
    fn input_exhausted_is_an_error_and_session_drops_cleanly() {
        let mut e = editor(b"\x1b[A");
        let err = e.run().unwrap_err();
        assert!(matches!(err, Error::InputRead(_)));
        assert_eq!(e.state, State::Running);

        drop(e);
        let e = editor(&[]);
        assert!(e.session.is_active());
    }

    #[test]
    #[serial(raw_session)]
    fn document_is_rendered() {
        let mut doc = Document::new();
        doc.load(["hello", "world"]);
        let dev = device(&[CTRL_Q]);
        let mut e = Editor::open(dev, doc, 1).unwrap();
        e.run().unwrap();

        let out = e.session.device().output_str();
        assert!(out.contains("hello\x1b[K\r\nworld\x1b[K\r\n~\x1b[K"));
        assert_eq!(e.doc.len(), 2);
    }

    // ── key dispatch ────────────────────────────────────────────────

    #[test]
    #[serial(raw_session)]
    fn dispatch_moves_and_quits() {
        let mut e = editor(&[]);

        assert_eq!(e.handle_key(Key::PageDown), Action::Continue);
        assert_eq!(e.cursor.cy(), 23);
        e.handle_key(Key::End);
        assert_eq!(e.cursor.cx(), 79);
        e.handle_key(Key::Right);
        e.handle_key(Key::Down);
        assert_eq!((e.cursor.cx(), e.cursor.cy()), (79, 23));
        e.handle_key(Key::Home);
        e.handle_key(Key::PageUp);
        assert_eq!((e.cursor.cx(), e.cursor.cy()), (0, 0));
        e.handle_key(Key::Up);
        e.handle_key(Key::Left);
        assert_eq!((e.cursor.cx(), e.cursor.cy()), (0, 0));

        assert_eq!(e.handle_key(QUIT_KEY), Action::Quit);
    }

    #[test]
    #[serial(raw_session)]
    fn unmapped_keys_are_ignored() {
        let mut e = editor(&[]);
        e.handle_key(Key::Down);
        let before = e.cursor;
        for key in [
            Key::Char(b'q'),
            Key::Char(0x7f),
            Key::Escape,
            Key::Delete,
            Key::ctrl(b'a'),
        ] {
            assert_eq!(e.handle_key(key), Action::Continue);
        }
        assert_eq!(e.cursor, before);
        assert_eq!(e.state, State::Running);
    }

    #[test]
    #[serial(raw_session)]
    fn terminate_is_final() {
        let mut e = editor(&[]);
        e.terminate().unwrap();
        assert_eq!(e.state, State::Terminated);
        // Loop exits without reading or rendering.
        let writes = e.session.device().writes;
        e.run().unwrap();
        assert_eq!(e.session.device().writes, writes);
    }
}
