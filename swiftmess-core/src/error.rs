//! Error types.
//!
//! Tokenizer errors are fatal to the current parse: the tokenizer stops at
//! the offending character and reports where it was and what it had
//! accumulated so far.

use std::fmt;

use thiserror::Error;

use crate::machine::StateName;
use crate::span::Location;

/// Error codes for tokenizer errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParseErrorCode {
    /// A character other than `{`, `}` or a line break outside of any block
    ExpectedBlockStart = 0,
    /// `}` at level 0
    UnmatchedCloseBrace,
    /// Line break at level 0 is required to end a message, but blocks are still open
    UnclosedNestedBlock,
    /// Non-digit in a block id, or a block id without digits
    InvalidBlockId,
    /// End of stream inside a block
    UnclosedBlockAtEof,
    /// End of stream with nested blocks still open
    UnclosedNestedBlockAtEof,
}

impl ParseErrorCode {
    /// Get a human-readable message for this error code.
    pub fn message(self) -> &'static str {
        match self {
            Self::ExpectedBlockStart => "block must start with '{'",
            Self::UnmatchedCloseBrace => "unmatched '}' outside of any block",
            Self::UnclosedNestedBlock => "nested block must be closed before end of line",
            Self::InvalidBlockId => "block id must consist of decimal digits",
            Self::UnclosedBlockAtEof => "block must be closed before end of input",
            Self::UnclosedNestedBlockAtEof => "nested block must be closed before end of input",
        }
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A tokenizer error with the context it was raised in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} at {location} (state={state}, level={level}{})", context(.found, .text))]
pub struct ParseError {
    pub code: ParseErrorCode,
    /// State the tokenizer was in when it failed.
    pub state: StateName,
    /// Offending character; `None` at end of input.
    pub found: Option<char>,
    pub level: usize,
    /// Partially scanned block id, field name or value.
    pub text: Option<String>,
    pub location: Location,
}

fn context(found: &Option<char>, text: &Option<String>) -> String {
    let mut out = String::new();
    if let Some(c) = found {
        out.push_str(&format!(", found={:?}", c));
    }
    if let Some(text) = text {
        out.push_str(&format!(", text={:?}", text));
    }
    out
}

/// Errors that can occur while reading, tokenizing, grouping or mapping.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A field item arrived before any block item.
    #[error("field {field:?} at level {level} must be inside a block")]
    FieldOutsideBlock { field: String, level: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid UTF-8 at byte offset {offset}")]
    InvalidUtf8 { offset: u64 },

    /// Builder content that would not read back as written.
    #[error("cannot build message: {0}")]
    Build(String),

    #[error("unknown report type {0:?}")]
    UnknownReportType(String),

    #[error("report type not found at level {level}, block {block}, field {}", .field.as_deref().unwrap_or("-"))]
    MissingReportType {
        level: usize,
        block: u64,
        field: Option<String>,
    },

    /// A field mapper could not convert a group's values.
    #[error("cannot map level {level}, block {block}, field {}: {message}", .field.as_deref().unwrap_or("-"))]
    Mapping {
        level: usize,
        block: u64,
        field: Option<String>,
        message: String,
    },
}

impl Error {
    /// Create a builder error.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }

    /// The tokenizer error code, if this is a tokenizer error.
    pub fn parse_code(&self) -> Option<ParseErrorCode> {
        match self {
            Error::Parse(error) => Some(error.code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
