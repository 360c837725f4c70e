//! Push-mode streaming with an item ring buffer.
//!
//! Input arrives in chunks, items are emitted into a ring as they are
//! recognized, and the consumer reads them at its own pace:
//!
//! ```text
//! Input Chunks        Tokenizer           Ring Buffer          Consumer
//!     │                  │                     │                   │
//!     │──feed(chunk)────▶│                     │                   │
//!     │                  │──push(item)────────▶│                   │
//!     │                  │                     │◀──read()──────────│
//!     │                  │                     │──item─────────────▶│
//!     │◀─bytes_consumed──│◀──backpressure──────│                   │
//! ```
//!
//! When the ring cannot hold the items of another transition, `feed` stops
//! early and reports how much of the chunk it consumed. The caller reads
//! items and feeds the remainder.

use tracing::trace;

use crate::error::{ParseError, Result};
use crate::item::Item;
use crate::machine::{Machine, MAX_EMITTED};
use crate::options::Options;

/// Ring buffer for items.
///
/// Uses power-of-2 sizing for fast modulo via bitmask. `push` grows the
/// buffer when it is full.
#[derive(Debug)]
pub struct ItemRing {
    /// The actual item storage (power-of-2 sized)
    items: Vec<Option<Item>>,
    /// Read position (consumer)
    read_pos: usize,
    /// Write position (producer)
    write_pos: usize,
    /// Number of items currently in buffer
    count: usize,
    /// Bitmask for fast modulo (capacity - 1)
    mask: usize,
}

impl ItemRing {
    /// Create a new ring buffer with at least the given capacity.
    /// Actual capacity will be rounded up to the next power of 2.
    pub fn new(min_capacity: usize) -> Self {
        let capacity = min_capacity.max(MAX_EMITTED).next_power_of_two();
        let mut items = Vec::with_capacity(capacity);
        items.resize_with(capacity, || None);
        Self {
            items,
            read_pos: 0,
            write_pos: 0,
            count: 0,
            mask: capacity - 1,
        }
    }

    /// Create with the capacity from the default [`Options`].
    pub fn with_default_capacity() -> Self {
        Self::new(Options::default().ring_capacity)
    }

    /// Actual capacity (power of 2).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of items available to read.
    #[inline]
    pub fn available(&self) -> usize {
        self.count
    }

    /// Space available for writing without growing.
    #[inline]
    pub fn space(&self) -> usize {
        self.capacity() - self.count
    }

    /// Push an item, doubling the capacity if the buffer is full.
    pub fn push(&mut self, item: Item) {
        if self.is_full() {
            self.grow();
        }
        self.items[self.write_pos] = Some(item);
        self.write_pos = (self.write_pos + 1) & self.mask;
        self.count += 1;
    }

    /// Pop an item from the front. Returns None if empty.
    #[inline]
    pub fn pop(&mut self) -> Option<Item> {
        if self.count == 0 {
            return None;
        }
        let item = self.items[self.read_pos].take();
        self.read_pos = (self.read_pos + 1) & self.mask;
        self.count -= 1;
        item
    }

    /// Double the capacity, moving the pending items to the front.
    fn grow(&mut self) {
        let capacity = self.capacity() * 2;
        let mut items = Vec::with_capacity(capacity);
        while let Some(item) = self.pop() {
            items.push(Some(item));
        }
        let count = items.len();
        items.resize_with(capacity, || None);
        trace!(capacity, "item ring grown");
        self.items = items;
        self.read_pos = 0;
        self.write_pos = count;
        self.count = count;
        self.mask = capacity - 1;
    }
}

impl Default for ItemRing {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Result of a feed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedResult {
    /// Number of bytes consumed from input
    pub bytes_consumed: usize,
    /// Number of items written to ring buffer
    pub items_written: usize,
    /// Whether the ring buffer is full (backpressure)
    pub buffer_full: bool,
}

/// Push-mode tokenizer fed with chunks of text.
///
/// ```
/// use swiftmess_core::{Item, StreamingTokenizer};
///
/// let mut tokenizer = StreamingTokenizer::new();
/// tokenizer.feed("{1:F01").unwrap();
/// tokenizer.feed("BANK}\n").unwrap();
/// tokenizer.finish().unwrap();
///
/// let items: Vec<Item> = std::iter::from_fn(|| tokenizer.read()).collect();
/// assert_eq!(items.len(), 3);
/// ```
#[derive(Debug)]
pub struct StreamingTokenizer {
    machine: Machine,
    ring: ItemRing,
    failed: Option<ParseError>,
}

impl StreamingTokenizer {
    pub fn new() -> Self {
        Self::with_options(&Options::default())
    }

    pub fn with_options(options: &Options) -> Self {
        Self {
            machine: Machine::new(),
            ring: ItemRing::new(options.ring_capacity),
            failed: None,
        }
    }

    /// Feed a chunk of input.
    ///
    /// Stops early when the ring buffer has no room for another transition;
    /// `bytes_consumed` tells where to resume after reading items. Once an
    /// error has been returned, every further call returns it again.
    pub fn feed(&mut self, chunk: &str) -> Result<FeedResult> {
        if let Some(error) = &self.failed {
            return Err(error.clone().into());
        }

        let mut bytes_consumed = 0;
        let mut items_written = 0;
        for c in chunk.chars() {
            if self.ring.space() < MAX_EMITTED {
                break;
            }
            match self.machine.feed(c) {
                Ok(emitted) => {
                    for item in emitted {
                        self.ring.push(item);
                        items_written += 1;
                    }
                }
                Err(error) => {
                    self.failed = Some(error.clone());
                    return Err(error.into());
                }
            }
            bytes_consumed += c.len_utf8();
        }

        Ok(FeedResult {
            bytes_consumed,
            items_written,
            buffer_full: self.ring.space() < MAX_EMITTED,
        })
    }

    /// Signal the end of input and run the end-of-input checks.
    pub fn finish(&mut self) -> Result<()> {
        if let Some(error) = &self.failed {
            return Err(error.clone().into());
        }
        if let Err(error) = self.machine.finish() {
            self.failed = Some(error.clone());
            return Err(error.into());
        }
        Ok(())
    }

    /// Read the next available item.
    #[inline]
    pub fn read(&mut self) -> Option<Item> {
        self.ring.pop()
    }

    /// Number of items waiting to be read.
    #[inline]
    pub fn available(&self) -> usize {
        self.ring.available()
    }

    /// Current nesting level.
    pub fn level(&self) -> usize {
        self.machine.level()
    }
}

impl Default for StreamingTokenizer {
    fn default() -> Self {
        Self::new()
    }
}
