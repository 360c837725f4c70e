//! Source positions.

use std::fmt;

/// A position in the input stream.
///
/// `offset` counts bytes from the start of the stream. `line` and `column`
/// are 1-based; the column counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub offset: u64,
    pub line: u32,
    pub column: u32,
}

impl Location {
    /// Create a location.
    #[inline]
    pub fn new(offset: u64, line: u32, column: u32) -> Self {
        Self { offset, line, column }
    }

    /// The position of the first character of a stream.
    #[inline]
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Move past `c`.
    ///
    /// A `'\n'` starts a new line. A `'\r'` advances the offset only, so
    /// CRLF and LF input report the same line and column numbers.
    #[inline]
    pub fn advance(&mut self, c: char) {
        self.offset += c.len_utf8() as u64;
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '\r' => {}
            _ => self.column += 1,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
