//! Document model — the rows loaded for display.
//!
//! A [`Document`] is an ordered, append-only list of [`Row`]s in file order.
//! Rows are raw bytes: no encoding is assumed, and nothing is ever edited in
//! place. Loading strips line terminators; rendering decides how much of each
//! row fits on screen.
//!
//! The document does no file I/O of its own. [`Document::from_reader`] takes
//! any [`BufRead`], so the binary owns opening the file and reporting the
//! failure, and tests feed it byte slices.

use std::io::{self, BufRead};

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of text, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    chars: Box<[u8]>,
}

impl Row {
    /// Build a row from `bytes`, dropping every trailing `\r` and `\n`.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            chars: strip_line_ending(bytes).into(),
        }
    }

    /// The row's bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the row has no content.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Trim any run of `\r` / `\n` from the end of `bytes`.
fn strip_line_ending(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |i| i + 1);
    &bytes[..end]
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Ordered, append-only sequence of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    rows: Vec<Row>,
}

impl Document {
    /// An empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append one line, stripping its trailing line terminators.
    pub fn append_row(&mut self, bytes: &[u8]) {
        self.rows.push(Row::new(bytes));
    }

    /// Append every line in order.
    pub fn load<I, L>(&mut self, lines: I)
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        for line in lines {
            self.append_row(line.as_ref());
        }
    }

    /// Read a document from `reader`, one row per `\n`-terminated line.
    ///
    /// Reads until end of input. A final line without a terminator still
    /// becomes a row; an empty input gives an empty document.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while reading.
    pub fn from_reader(mut reader: impl BufRead) -> io::Result<Self> {
        let mut doc = Self::new();
        let mut line = Vec::new();

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            doc.append_row(&line);
        }

        tracing::debug!(rows = doc.len(), "document loaded");
        Ok(doc)
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index`, if any.
    #[inline]
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// All rows in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
