//! Pull-mode tokenizer.
//!
//! [`Tokenizer`] is a lazy, single-pass iterator: each call to `next` reads
//! just enough characters from its source to produce the next item. After
//! an error, or after the end of input has been checked, it only returns
//! `None`. Dropping it half-way is always fine; all state is its own.

use std::io::Read;
use std::iter::FusedIterator;

use crate::error::Result;
use crate::item::Item;
use crate::machine::Machine;
use crate::options::Options;
use crate::source::{CharSource, ReadSource, StrSource};
use crate::span::Location;
use crate::streaming::ItemRing;

/// Iterator over the items of a character source.
///
/// ```
/// use swiftmess_core::{Item, Tokenizer};
///
/// let items: Vec<Item> = Tokenizer::from_text("{3:{108:ABC}}\n")
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(items[1], Item::Block { level: 2, id: 108 });
/// ```
#[derive(Debug)]
pub struct Tokenizer<S> {
    source: S,
    machine: Machine,
    ring: ItemRing,
    done: bool,
}

impl<S: CharSource> Tokenizer<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, &Options::default())
    }

    pub fn with_options(source: S, options: &Options) -> Self {
        Self {
            source,
            machine: Machine::new(),
            ring: ItemRing::new(options.ring_capacity),
            done: false,
        }
    }

    /// Current nesting level.
    pub fn level(&self) -> usize {
        self.machine.level()
    }

    /// Position of the next character to be read.
    pub fn location(&self) -> Location {
        self.machine.location()
    }
}

impl<'a> Tokenizer<StrSource<'a>> {
    pub fn from_text(input: &'a str) -> Self {
        Self::new(StrSource::new(input))
    }
}

impl<R: Read> Tokenizer<ReadSource<R>> {
    pub fn from_reader(reader: R) -> Self {
        Self::new(ReadSource::new(reader))
    }
}

impl<S: CharSource> Iterator for Tokenizer<S> {
    type Item = Result<Item>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.ring.pop() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            match self.source.next_char() {
                Ok(Some(c)) => match self.machine.feed(c) {
                    Ok(emitted) => {
                        for item in emitted {
                            self.ring.push(item);
                        }
                    }
                    Err(error) => {
                        self.done = true;
                        return Some(Err(error.into()));
                    }
                },
                Ok(None) => {
                    self.done = true;
                    if let Err(error) = self.machine.finish() {
                        return Some(Err(error.into()));
                    }
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

impl<S: CharSource> FusedIterator for Tokenizer<S> {}

/// Items of the messages stored in `reader`.
pub fn message_items<R: Read>(reader: R) -> Tokenizer<ReadSource<R>> {
    Tokenizer::from_reader(reader)
}

/// Tokenize a whole string.
pub fn parse_str(input: &str) -> Result<Vec<Item>> {
    Tokenizer::from_text(input).collect()
}
