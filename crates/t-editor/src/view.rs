//! View — composes one full screen from the document and cursor.
//!
//! [`render`] writes a complete frame into a [`FrameBuffer`]; the caller
//! flushes it to the device in one write. The frame layout:
//!
//! ```text
//! ESC[?25l ESC[H                      hide cursor, go home
//! row 0   ESC[K \r\n                  text (or `~`), erase rest of line
//! row 1   ESC[K \r\n
//! ...
//! row n-1 ESC[K                       no line break after the last row
//! ESC[<cy+1>;<cx+1>H ESC[?25h         place and show the cursor
//! ```
//!
//! Rows past the end of the document show a `~` marker. Rows longer than
//! the viewport are cut at `cols` bytes; there is no horizontal scrolling.
//! Hiding the cursor while drawing keeps it from flickering across the
//! screen, and erasing each line as it is written avoids a full clear.

use std::io;

use t_term::ansi;
use t_term::output::FrameBuffer;
use t_term::terminal::Size;

use crate::cursor::Cursor;
use crate::document::Document;

/// Marker drawn on viewport rows with no document row behind them.
pub const EMPTY_ROW_MARKER: &[u8] = b"~";

/// Compose a full frame into `frame`.
///
/// `frame` is appended to; callers normally pass a cleared buffer.
///
/// # Errors
///
/// Propagates write errors from `frame`. A [`FrameBuffer`] never fails,
/// so in practice this is infallible.
pub fn render(
    doc: &Document,
    cursor: Cursor,
    size: Size,
    frame: &mut FrameBuffer,
) -> io::Result<()> {
    ansi::cursor_hide(frame)?;
    ansi::cursor_home(frame)?;

    draw_rows(doc, size, frame)?;

    ansi::cursor_to(frame, cursor.cx(), cursor.cy())?;
    ansi::cursor_show(frame)?;
    Ok(())
}

fn draw_rows(doc: &Document, size: Size, frame: &mut FrameBuffer) -> io::Result<()> {
    let cols = usize::from(size.cols);

    for y in 0..usize::from(size.rows) {
        match doc.row(y) {
            Some(row) => {
                let text = row.as_bytes();
                frame.push_bytes(&text[..text.len().min(cols)]);
            }
            None => frame.push_bytes(EMPTY_ROW_MARKER),
        }

        ansi::erase_line(frame)?;

        if y + 1 < usize::from(size.rows) {
            frame.push_bytes(b"\r\n");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame_for(doc: &Document, cursor: Cursor, size: Size) -> Vec<u8> {
        let mut frame = FrameBuffer::new();
        render(doc, cursor, size, &mut frame).unwrap();
        frame.as_bytes().to_vec()
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .filter(|w| *w == needle)
            .count()
    }

    #[test]
    fn empty_document_24_rows() {
        let size = Size { cols: 80, rows: 24 };
        let out = frame_for(&Document::new(), Cursor::new(), size);

        let mut expected = b"\x1b[?25l\x1b[H".to_vec();
        for y in 0..24 {
            expected.extend_from_slice(b"~\x1b[K");
            if y < 23 {
                expected.extend_from_slice(b"\r\n");
            }
        }
        expected.extend_from_slice(b"\x1b[1;1H\x1b[?25h");

        assert_eq!(out, expected);
        assert_eq!(count(&out, b"~\x1b[K"), 24);
        assert_eq!(count(&out, b"\r\n"), 23);
    }

    #[test]
    fn document_rows_then_markers() {
        let mut doc = Document::new();
        doc.load([b"first".as_slice(), b"second".as_slice()]);
        let size = Size { cols: 20, rows: 4 };
        let out = frame_for(&doc, Cursor::new(), size);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\x1b[?25l\x1b[H\
             first\x1b[K\r\n\
             second\x1b[K\r\n\
             ~\x1b[K\r\n\
             ~\x1b[K\
             \x1b[1;1H\x1b[?25h"
        );
    }

    #[test]
    fn long_rows_are_truncated_to_width() {
        let mut doc = Document::new();
        doc.append_row(b"0123456789abcdef");
        let size = Size { cols: 10, rows: 1 };
        let out = frame_for(&doc, Cursor::new(), size);

        assert_eq!(out, b"\x1b[?25l\x1b[H0123456789\x1b[K\x1b[1;1H\x1b[?25h".to_vec());
    }

    #[test]
    fn rows_beyond_viewport_are_not_drawn() {
        let mut doc = Document::new();
        doc.load((0..50).map(|i| format!("line {i}")));
        let size = Size { cols: 80, rows: 3 };
        let out = String::from_utf8(frame_for(&doc, Cursor::new(), size)).unwrap();

        assert!(out.contains("line 2"));
        assert!(!out.contains("line 3"));
        assert!(!out.contains('~'));
    }

    #[test]
    fn empty_row_draws_nothing_but_erase() {
        let mut doc = Document::new();
        doc.append_row(b"\n");
        let size = Size { cols: 5, rows: 2 };
        let out = frame_for(&doc, Cursor::new(), size);
        assert_eq!(
            out,
            b"\x1b[?25l\x1b[H\x1b[K\r\n~\x1b[K\x1b[1;1H\x1b[?25h".to_vec()
        );
    }

    #[test]
    fn cursor_is_one_indexed_row_first() {
        let size = Size { cols: 80, rows: 24 };
        let out = frame_for(&Document::new(), Cursor::at(9, 4, size), size);
        assert!(out.ends_with(b"\x1b[5;10H\x1b[?25h"));
    }

    #[test]
    fn render_appends_to_frame() {
        let size = Size { cols: 4, rows: 1 };
        let mut frame = FrameBuffer::new();
        frame.push_bytes(b"pre");
        render(&Document::new(), Cursor::new(), size, &mut frame).unwrap();
        assert!(frame.as_bytes().starts_with(b"pre\x1b[?25l"));
    }
}
