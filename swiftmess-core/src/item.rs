//! Message items - the output of the tokenizer.
//!
//! Items are emitted in document order as the tokenizer recognizes block,
//! field and value boundaries. Nesting is reported as a plain level counter;
//! there are no explicit "end of block" items.
//!
//! `{1:F01BANK}{3:{108:REF}}\n` emits:
//! ```text
//! Block { level: 1, id: 1 }
//! Value { level: 1, text: "F01BANK" }
//! Block { level: 1, id: 3 }
//! Block { level: 2, id: 108 }
//! Value { level: 2, text: "REF" }
//! Message { level: 0 }
//! ```
//!
//! A field `:20:REF1` inside a block emits `Field { name: "20" }` followed by
//! `Value { text: "REF1" }`. Lines that follow the field without a `:` are
//! emitted as further `Value` items.

use std::fmt;

use phf::phf_map;

/// Names of the well-known top-level blocks.
static BLOCK_NAMES: phf::Map<u64, &'static str> = phf_map! {
    1u64 => "basic header",
    2u64 => "application header",
    3u64 => "user header",
    4u64 => "text",
    5u64 => "trailer",
};

/// Human readable name of a well-known block id, e.g. `4` is the text block.
pub fn block_name(id: u64) -> Option<&'static str> {
    BLOCK_NAMES.get(&id).copied()
}

/// The kind of an [`Item`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ItemKind {
    Message,
    Block,
    Field,
    Value,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Block => "block",
            Self::Field => "field",
            Self::Value => "value",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tokenizer item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum Item {
    /// End of one complete message: a line break at level 0.
    Message { level: usize },

    /// Block start: `{id:`
    Block { level: usize, id: u64 },

    /// Field name: `:name:`
    ///
    /// Always followed by the `Value` holding the rest of the line.
    Field { level: usize, name: String },

    /// Value text, possibly empty.
    Value { level: usize, text: String },
}

impl Item {
    /// Nesting level at which the item was found.
    #[inline]
    pub fn level(&self) -> usize {
        match self {
            Item::Message { level }
            | Item::Block { level, .. }
            | Item::Field { level, .. }
            | Item::Value { level, .. } => *level,
        }
    }

    #[inline]
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Message { .. } => ItemKind::Message,
            Item::Block { .. } => ItemKind::Block,
            Item::Field { .. } => ItemKind::Field,
            Item::Value { .. } => ItemKind::Value,
        }
    }

    /// Block id, for block items.
    #[inline]
    pub fn block_id(&self) -> Option<u64> {
        match self {
            Item::Block { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Field name or value text, for field and value items.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        match self {
            Item::Field { name, .. } => Some(name),
            Item::Value { text, .. } => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn is_message(&self) -> bool {
        matches!(self, Item::Message { .. })
    }
}

/// Renders as the `(level, kind, payload)` triple, e.g. `(1, block, 4)`.
impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Message { level } => write!(f, "({}, message, None)", level),
            Item::Block { level, id } => write!(f, "({}, block, {})", level, id),
            Item::Field { level, name } => write!(f, "({}, field, {:?})", level, name),
            Item::Value { level, text } => write!(f, "({}, value, {:?})", level, text),
        }
    }
}
