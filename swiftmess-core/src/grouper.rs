//! Structural grouping of tokenizer items.
//!
//! Consecutive value items are collected under the most recent block/field
//! pair. A group ends when the next block or field item arrives:
//!
//! ```text
//! Block 4, Value "", Field 20, Value "REF", Field 77E, Value "/A", Value "/B"
//!
//! (1, 4, None, [""])
//! (1, 4, "20", ["REF"])
//! (1, 4, "77E", ["/A", "/B"])
//! ```
//!
//! Values are kept in encounter order, never merged or deduplicated.

use std::fmt;
use std::iter::FusedIterator;

use tracing::trace;

use crate::error::{Error, Result};
use crate::item::{block_name, Item};
use crate::options::Options;
use crate::tokenizer::Tokenizer;

/// Values collected under one block/field pair.
///
/// `field` is `None` for the values a block holds before its first field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    pub level: usize,
    pub block: Option<u64>,
    pub field: Option<String>,
    pub values: Vec<String>,
}

impl Group {
    pub fn new(level: usize, block: Option<u64>, field: Option<&str>, values: &[&str]) -> Self {
        Self {
            level,
            block,
            field: field.map(str::to_string),
            values: values.iter().map(|value| value.to_string()).collect(),
        }
    }

    /// Check whether this group sits at the given level/block/field triple.
    pub fn is_at(&self, level: usize, block: u64, field: Option<&str>) -> bool {
        self.level == level && self.block == Some(block) && self.field.as_deref() == field
    }

    #[inline]
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// All values joined by line breaks, as they appeared in the message.
    pub fn text(&self) -> String {
        self.values.join("\n")
    }

    /// Name of the block, if it is one of the well-known top-level blocks.
    pub fn block_name(&self) -> Option<&'static str> {
        match (self.level, self.block) {
            (1, Some(id)) => block_name(id),
            _ => None,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, ", self.level)?;
        match self.block {
            Some(id) => write!(f, "{}, ", id)?,
            None => f.write_str("None, ")?,
        }
        match &self.field {
            Some(field) => write!(f, "{:?}, ", field)?,
            None => f.write_str("None, ")?,
        }
        write!(f, "{:?})", self.values)
    }
}

/// Grouping state: the open block/field pair and its values so far.
#[derive(Debug, Default)]
struct Fold {
    level: usize,
    block: Option<u64>,
    field: Option<String>,
    values: Vec<String>,
}

impl Fold {
    fn accept(&mut self, item: Item) -> Result<Option<Group>> {
        match item {
            Item::Block { level, id } => {
                // Values before the first block belong to no group.
                let ended = match self.block {
                    Some(_) => Some(self.take()),
                    None => {
                        self.field = None;
                        self.values.clear();
                        None
                    }
                };
                self.level = level;
                self.block = Some(id);
                Ok(ended)
            }
            Item::Field { level, name } => {
                if self.block.is_none() {
                    return Err(Error::FieldOutsideBlock { field: name, level });
                }
                let ended = self.take();
                self.level = level;
                self.field = Some(name);
                Ok(Some(ended))
            }
            Item::Value { text, .. } => {
                self.values.push(text);
                Ok(None)
            }
            Item::Message { .. } => Ok(None),
        }
    }

    /// Close the open block at a message boundary and forget it.
    fn end_message(&mut self) -> Option<Group> {
        let ended = (self.block.is_some() || !self.values.is_empty()).then(|| self.take());
        self.block = None;
        self.level = 0;
        ended
    }

    /// Values still pending at the end of input.
    fn finish(&mut self) -> Option<Group> {
        (!self.values.is_empty()).then(|| self.take())
    }

    fn take(&mut self) -> Group {
        let group = Group {
            level: self.level,
            block: self.block,
            field: self.field.take(),
            values: std::mem::take(&mut self.values),
        };
        trace!(%group, "group");
        group
    }
}

/// Iterator over the groups of an item stream.
#[derive(Debug)]
pub struct Grouper<I> {
    items: I,
    fold: Fold,
    reset_on_message: bool,
    done: bool,
}

impl<I> Grouper<I>
where
    I: Iterator<Item = Result<Item>>,
{
    pub fn new(items: I) -> Self {
        Self::with_options(items, &Options::default())
    }

    pub fn with_options(items: I, options: &Options) -> Self {
        Self {
            items,
            fold: Fold::default(),
            reset_on_message: options.reset_on_message,
            done: false,
        }
    }
}

impl<I> Iterator for Grouper<I>
where
    I: Iterator<Item = Result<Item>>,
{
    type Item = Result<Group>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let item = match self.items.next() {
                Some(Ok(item)) => item,
                Some(Err(error)) => {
                    self.done = true;
                    return Some(Err(error));
                }
                None => {
                    self.done = true;
                    return self.fold.finish().map(Ok);
                }
            };

            if self.reset_on_message && item.is_message() {
                match self.fold.end_message() {
                    Some(group) => return Some(Ok(group)),
                    None => continue,
                }
            }

            match self.fold.accept(item) {
                Ok(Some(group)) => return Some(Ok(group)),
                Ok(None) => continue,
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

impl<I> FusedIterator for Grouper<I> where I: Iterator<Item = Result<Item>> {}

/// Iterator over the groups of each message in an item stream.
///
/// Block/field state is reset at every message boundary. Messages without
/// any group (blank lines between messages) are skipped. A last message that
/// is not terminated by a line break is still yielded.
#[derive(Debug)]
pub struct Messages<I> {
    items: I,
    fold: Fold,
    done: bool,
}

impl<I> Messages<I>
where
    I: Iterator<Item = Result<Item>>,
{
    pub fn new(items: I) -> Self {
        Self {
            items,
            fold: Fold::default(),
            done: false,
        }
    }
}

impl<I> Iterator for Messages<I>
where
    I: Iterator<Item = Result<Item>>,
{
    type Item = Result<Vec<Group>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut groups = Vec::new();
        loop {
            match self.items.next() {
                Some(Ok(item)) if item.is_message() => {
                    groups.extend(self.fold.end_message());
                    if !groups.is_empty() {
                        return Some(Ok(groups));
                    }
                }
                Some(Ok(item)) => match self.fold.accept(item) {
                    Ok(group) => groups.extend(group),
                    Err(error) => {
                        self.done = true;
                        return Some(Err(error));
                    }
                },
                Some(Err(error)) => {
                    self.done = true;
                    return Some(Err(error));
                }
                None => {
                    self.done = true;
                    groups.extend(self.fold.end_message());
                    return (!groups.is_empty()).then_some(Ok(groups));
                }
            }
        }
    }
}

impl<I> FusedIterator for Messages<I> where I: Iterator<Item = Result<Item>> {}

/// Grouping adapters for item streams.
pub trait GroupItems: Iterator<Item = Result<Item>> + Sized {
    /// Fold items into groups.
    fn groups(self) -> Grouper<Self> {
        Grouper::new(self)
    }

    /// Fold items into groups, one `Vec` per message.
    fn messages(self) -> Messages<Self> {
        Messages::new(self)
    }
}

impl<I> GroupItems for I where I: Iterator<Item = Result<Item>> {}

/// Tokenize and group a whole string.
pub fn group_str(input: &str) -> Result<Vec<Group>> {
    Tokenizer::from_text(input).groups().collect()
}
