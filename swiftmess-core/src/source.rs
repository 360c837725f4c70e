//! Character sources for the pull tokenizer.
//!
//! The tokenizer reads one character at a time and never looks back, so a
//! source only has to produce the next character or report the end of input.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::str::Chars;

use crate::error::{Error, Result};

/// A sequential source of characters.
pub trait CharSource {
    /// Next character, or `None` at end of input.
    fn next_char(&mut self) -> Result<Option<char>>;
}

/// Characters of an in-memory string.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { chars: input.chars() }
    }
}

impl CharSource for StrSource<'_> {
    #[inline]
    fn next_char(&mut self) -> Result<Option<char>> {
        Ok(self.chars.next())
    }
}

/// Characters decoded as UTF-8 from a reader.
///
/// Reads are buffered; decoding happens one character at a time so that
/// the tokenizer can fail before the rest of the input has been read.
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: BufReader<R>,
    offset: u64,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            offset: 0,
        }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => {
                    let Some(&byte) = buf.first() else {
                        return Ok(None);
                    };
                    self.reader.consume(1);
                    self.offset += 1;
                    return Ok(Some(byte));
                }
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            }
        }
    }
}

impl<R: Read> CharSource for ReadSource<R> {
    fn next_char(&mut self) -> Result<Option<char>> {
        let start = self.offset;
        let Some(first) = self.next_byte()? else {
            return Ok(None);
        };
        let width = utf8_width(first);
        if width == 0 {
            return Err(Error::InvalidUtf8 { offset: start });
        }

        let mut bytes = [first, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self.next_byte()?.ok_or(Error::InvalidUtf8 { offset: start })?;
        }
        std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or(Error::InvalidUtf8 { offset: start })
    }
}

/// Length of the UTF-8 sequence introduced by `first`, or 0 if `first`
/// cannot start a sequence.
#[inline]
fn utf8_width(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}
