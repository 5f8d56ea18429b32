//! Cursor — the logical cursor position on the viewport.
//!
//! The cursor lives in screen coordinates: `cx` is a column, `cy` a row, both
//! 0-indexed. It is bounded by the viewport, not by the document. Every
//! movement clamps to `[0, cols - 1] × [0, rows - 1]`, so a cursor that
//! starts in range stays in range no matter how often it is pushed against an
//! edge.
//!
//! The viewport [`Size`] is passed to each movement rather than stored, the
//! same way a cursor elsewhere is handed the buffer it moves through.

use t_term::terminal::Size;

/// Direction of a single cursor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A cursor position on the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    cx: u16,
    cy: u16,
}

impl Cursor {
    /// A cursor at the top-left corner.
    #[must_use]
    pub const fn new() -> Self {
        Self { cx: 0, cy: 0 }
    }

    /// A cursor at `(cx, cy)`, clamped into `size`.
    #[must_use]
    pub fn at(cx: u16, cy: u16, size: Size) -> Self {
        let mut c = Self { cx, cy };
        c.clamp(size);
        c
    }

    /// Column, 0-indexed.
    #[inline]
    #[must_use]
    pub const fn cx(self) -> u16 {
        self.cx
    }

    /// Row, 0-indexed.
    #[inline]
    #[must_use]
    pub const fn cy(self) -> u16 {
        self.cy
    }

    /// Move one step in `dir`, stopping at the viewport edge.
    pub fn move_cursor(&mut self, dir: Direction, size: Size) {
        match dir {
            Direction::Left => self.cx = self.cx.saturating_sub(1),
            Direction::Right => {
                if self.cx < last(size.cols) {
                    self.cx += 1;
                }
            }
            Direction::Up => self.cy = self.cy.saturating_sub(1),
            Direction::Down => {
                if self.cy < last(size.rows) {
                    self.cy += 1;
                }
            }
        }
    }

    /// Move a full screen height in `dir`.
    ///
    /// Paging is one clamped step repeated `size.rows` times. Nothing
    /// scrolls: the cursor simply ends up on the first or last row.
    pub fn page(&mut self, dir: Direction, size: Size) {
        for _ in 0..size.rows {
            self.move_cursor(dir, size);
        }
    }

    /// Jump to the first column.
    pub const fn home(&mut self) {
        self.cx = 0;
    }

    /// Jump to the last column of the viewport.
    pub const fn end(&mut self, size: Size) {
        self.cx = last(size.cols);
    }

    /// Pull the cursor back inside `size`.
    pub fn clamp(&mut self, size: Size) {
        self.cx = self.cx.min(last(size.cols));
        self.cy = self.cy.min(last(size.rows));
    }
}

/// Highest valid index for an extent. `Size` guarantees a non-zero extent;
/// `saturating_sub` keeps a hand-built zero size from wrapping.
const fn last(extent: u16) -> u16 {
    extent.saturating_sub(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
