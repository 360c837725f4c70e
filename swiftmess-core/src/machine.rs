//! The tokenizer state machine.
//!
//! The grammar is LL(1) over single characters, so the machine only ever
//! looks at the current character. Each state carries the text it is
//! accumulating; a transition consumes the old state and produces the next
//! one together with the items it emitted (at most two).
//!
//! ```text
//! BeforeStartOfBlock --'{'--> InBlockKey --':'--> InLine
//! InLine --':'--> InFieldKey --':'--> InFieldValue --'\n'--> InLine
//! InLine --other--> InValue --'\n'--> InLine
//! InFieldValue / InValue --'}'--> BeforeStartOfBlock
//! InLine --'}'--> BeforeStartOfBlock
//! InLine --'{'--> InBlockKey (nested)
//! ```
//!
//! Nesting is tracked by a counter only; a `}` is never matched against the
//! id of the block it closes.

use std::fmt;

use tracing::{debug, trace};

use crate::error::{ParseError, ParseErrorCode};
use crate::item::Item;
use crate::span::Location;

/// Name of a tokenizer state, without the state's accumulated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateName {
    BeforeStartOfBlock,
    InBlockKey,
    InLine,
    InFieldKey,
    InFieldValue,
    InValue,
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tokenizer state with the text scanned so far.
///
/// An open value segment always has a `text` (possibly empty). The absence
/// of a segment is expressed by the state itself, never by an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum State {
    /// Outside of any block, or right after a nested block was closed.
    #[default]
    BeforeStartOfBlock,
    /// After `{`, scanning decimal digits up to `:`.
    InBlockKey { digits: String },
    /// Inside a block at the start of a line, nothing scanned yet.
    InLine,
    /// After a leading `:`, scanning the field name up to the next `:`.
    InFieldKey { name: String },
    /// Scanning the value of field `name` up to a line break or `}`.
    InFieldValue { name: String, text: String },
    /// Scanning an unlabelled value up to a line break or `}`.
    InValue { text: String },
}

impl State {
    pub fn name(&self) -> StateName {
        match self {
            State::BeforeStartOfBlock => StateName::BeforeStartOfBlock,
            State::InBlockKey { .. } => StateName::InBlockKey,
            State::InLine => StateName::InLine,
            State::InFieldKey { .. } => StateName::InFieldKey,
            State::InFieldValue { .. } => StateName::InFieldValue,
            State::InValue { .. } => StateName::InValue,
        }
    }

    /// Text accumulated in this state, if the state accumulates any.
    pub fn text(&self) -> Option<&str> {
        match self {
            State::BeforeStartOfBlock | State::InLine => None,
            State::InBlockKey { digits } => Some(digits),
            State::InFieldKey { name } => Some(name),
            State::InFieldValue { text, .. } | State::InValue { text } => Some(text),
        }
    }
}

/// Items emitted by a single transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Emitted {
    items: [Option<Item>; 2],
}

impl Emitted {
    #[inline]
    pub fn none() -> Self {
        Self::default()
    }

    #[inline]
    pub fn one(item: Item) -> Self {
        Self { items: [Some(item), None] }
    }

    #[inline]
    pub fn two(first: Item, second: Item) -> Self {
        Self { items: [Some(first), Some(second)] }
    }

    pub fn len(&self) -> usize {
        self.items.iter().filter(|item| item.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items[0].is_none()
    }
}

impl IntoIterator for Emitted {
    type Item = Item;
    type IntoIter = std::iter::Flatten<std::array::IntoIter<Option<Item>, 2>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter().flatten()
    }
}

/// Most items a single transition can emit.
pub const MAX_EMITTED: usize = 2;

/// The tokenizer state machine: state, nesting level and input position.
///
/// Feed it one character at a time, then call [`Machine::finish`] once the
/// input is exhausted.
#[derive(Debug, Clone, Default)]
pub struct Machine {
    state: State,
    level: usize,
    location: Location,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting level.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    #[inline]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Position of the next character to be fed.
    #[inline]
    pub fn location(&self) -> Location {
        self.location
    }

    /// True between messages: outside of any block at level 0.
    pub fn is_idle(&self) -> bool {
        self.level == 0 && self.state == State::BeforeStartOfBlock
    }

    /// Feed one character.
    ///
    /// `'\r'` is discarded in every state. On error the machine keeps the
    /// state it failed in; it must not be fed any further.
    pub fn feed(&mut self, c: char) -> Result<Emitted, ParseError> {
        trace!(
            level = self.level,
            char = ?c,
            state = %self.state.name(),
            text = ?self.state.text(),
            "feed"
        );
        let result = if c == '\r' {
            Ok(Emitted::none())
        } else {
            self.transition(c)
        };
        self.location.advance(c);
        result
    }

    /// Check that the input ended between messages.
    pub fn finish(&self) -> Result<(), ParseError> {
        if self.state != State::BeforeStartOfBlock {
            return Err(self.error(ParseErrorCode::UnclosedBlockAtEof, None));
        }
        if self.level != 0 {
            return Err(self.error(ParseErrorCode::UnclosedNestedBlockAtEof, None));
        }
        Ok(())
    }

    fn transition(&mut self, c: char) -> Result<Emitted, ParseError> {
        let (next, emitted) = match std::mem::take(&mut self.state) {
            State::BeforeStartOfBlock => match c {
                '{' => self.open_block(),
                '}' => {
                    if self.level == 0 {
                        return Err(self.fail(ParseErrorCode::UnmatchedCloseBrace, c, State::BeforeStartOfBlock));
                    }
                    self.level -= 1;
                    (State::BeforeStartOfBlock, Emitted::none())
                }
                '\n' => {
                    if self.level != 0 {
                        return Err(self.fail(ParseErrorCode::UnclosedNestedBlock, c, State::BeforeStartOfBlock));
                    }
                    debug!(location = %self.location, "message complete");
                    (State::BeforeStartOfBlock, Emitted::one(Item::Message { level: self.level }))
                }
                _ => return Err(self.fail(ParseErrorCode::ExpectedBlockStart, c, State::BeforeStartOfBlock)),
            },

            State::InBlockKey { mut digits } => match c {
                ':' => match digits.parse::<u64>() {
                    Ok(id) => (State::InLine, Emitted::one(Item::Block { level: self.level, id })),
                    Err(_) => {
                        return Err(self.fail(ParseErrorCode::InvalidBlockId, c, State::InBlockKey { digits }))
                    }
                },
                '0'..='9' => {
                    digits.push(c);
                    (State::InBlockKey { digits }, Emitted::none())
                }
                _ => return Err(self.fail(ParseErrorCode::InvalidBlockId, c, State::InBlockKey { digits })),
            },

            State::InLine => match c {
                '{' => self.open_block(),
                '}' => {
                    self.close_block();
                    (State::BeforeStartOfBlock, Emitted::none())
                }
                ':' => (State::InFieldKey { name: String::new() }, Emitted::none()),
                '\n' => (
                    State::InLine,
                    Emitted::one(Item::Value { level: self.level, text: String::new() }),
                ),
                _ => (State::InValue { text: String::from(c) }, Emitted::none()),
            },

            State::InFieldKey { mut name } => match c {
                ':' => (State::InFieldValue { name, text: String::new() }, Emitted::none()),
                _ => {
                    name.push(c);
                    (State::InFieldKey { name }, Emitted::none())
                }
            },

            State::InFieldValue { name, mut text } => match c {
                '\n' | '}' => {
                    let level = self.level;
                    let emitted = Emitted::two(Item::Field { level, name }, Item::Value { level, text });
                    (self.end_line(c), emitted)
                }
                _ => {
                    text.push(c);
                    (State::InFieldValue { name, text }, Emitted::none())
                }
            },

            State::InValue { mut text } => match c {
                '\n' | '}' => {
                    let emitted = Emitted::one(Item::Value { level: self.level, text });
                    (self.end_line(c), emitted)
                }
                _ => {
                    text.push(c);
                    (State::InValue { text }, Emitted::none())
                }
            },
        };
        self.state = next;
        Ok(emitted)
    }

    fn open_block(&mut self) -> (State, Emitted) {
        self.level += 1;
        (State::InBlockKey { digits: String::new() }, Emitted::none())
    }

    // Only reached inside a block, where the level is at least 1.
    fn close_block(&mut self) {
        debug_assert!(self.level > 0);
        self.level = self.level.saturating_sub(1);
    }

    /// State after a value terminated by `c`.
    fn end_line(&mut self, c: char) -> State {
        if c == '}' {
            self.close_block();
            State::BeforeStartOfBlock
        } else {
            State::InLine
        }
    }

    /// Restore the state the machine failed in and describe the failure.
    fn fail(&mut self, code: ParseErrorCode, c: char, state: State) -> ParseError {
        self.state = state;
        self.error(code, Some(c))
    }

    fn error(&self, code: ParseErrorCode, found: Option<char>) -> ParseError {
        ParseError {
            code,
            state: self.state.name(),
            found,
            level: self.level,
            text: self.state.text().map(str::to_string),
            location: self.location,
        }
    }
}
