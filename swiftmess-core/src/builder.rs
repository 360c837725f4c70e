//! Building well-formed messages.
//!
//! The builder is the mirror image of the tokenizer: it renders blocks,
//! fields and values as text and can tell which items that text reads back
//! as. Content that would read back differently is rejected when rendering.
//!
//! ```
//! use swiftmess_core::{parse_str, BlockBuilder, MessageBuilder};
//!
//! let message = MessageBuilder::new()
//!     .block(BlockBuilder::new(1).value("F01BANK"))
//!     .block(BlockBuilder::new(3).block(BlockBuilder::new(108).value("REF")))
//!     .block(BlockBuilder::new(4).value("").field("20", "99990212189999").value("-"));
//!
//! let text = message.render().unwrap();
//! assert_eq!(text, "{1:F01BANK}{3:{108:REF}}{4:\n:20:99990212189999\n-}\n");
//! assert_eq!(parse_str(&text).unwrap(), message.items());
//! ```

use memchr::{memchr2, memchr3};

use crate::error::{Error, Result};
use crate::item::Item;

/// One entry of a block, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Unlabelled value line.
    Value(String),
    /// `:name:value` line.
    Field { name: String, value: String },
    /// Nested block.
    Block(BlockBuilder),
}

/// A `{id:...}` block under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBuilder {
    id: u64,
    entries: Vec<Entry>,
}

impl BlockBuilder {
    pub fn new(id: u64) -> Self {
        Self { id, entries: Vec::new() }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn value(mut self, text: impl Into<String>) -> Self {
        self.entries.push(Entry::Value(text.into()));
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push(Entry::Field {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn block(mut self, block: BlockBuilder) -> Self {
        self.entries.push(Entry::Block(block));
        self
    }

    /// Render the block as text.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Append the rendered block to `out`.
    pub fn write_to(&self, out: &mut String) -> Result<()> {
        out.push('{');
        out.push_str(&self.id.to_string());
        out.push(':');

        let mut after_block = false;
        for (index, entry) in self.entries.iter().enumerate() {
            if after_block {
                if !matches!(entry, Entry::Block(_)) {
                    return Err(Error::build(format!(
                        "block {}: only nested blocks may follow a nested block",
                        self.id
                    )));
                }
            } else if index > 0 {
                out.push('\n');
            }

            match entry {
                Entry::Value(text) => {
                    check_value(self.id, text)?;
                    if text.is_empty() && index + 1 == self.entries.len() {
                        return Err(Error::build(format!(
                            "block {}: an empty value cannot end a block",
                            self.id
                        )));
                    }
                    if let Some(first @ ('{' | '}' | ':')) = text.chars().next() {
                        return Err(Error::build(format!(
                            "block {}: value {:?} must not start with {:?}",
                            self.id, text, first
                        )));
                    }
                    out.push_str(text);
                }
                Entry::Field { name, value } => {
                    if memchr2(b':', b'\r', name.as_bytes()).is_some() {
                        return Err(Error::build(format!(
                            "block {}: field name {:?} must not contain ':' or '\\r'",
                            self.id, name
                        )));
                    }
                    check_value(self.id, value)?;
                    out.push(':');
                    out.push_str(name);
                    out.push(':');
                    out.push_str(value);
                }
                Entry::Block(block) => block.write_to(out)?,
            }
            after_block = matches!(entry, Entry::Block(_));
        }

        out.push('}');
        Ok(())
    }

    /// Items the rendered block reads back as, with the block at `level`.
    pub fn items(&self, level: usize) -> Vec<Item> {
        let mut items = Vec::new();
        self.collect_items(level, &mut items);
        items
    }

    fn collect_items(&self, level: usize, items: &mut Vec<Item>) {
        items.push(Item::Block { level, id: self.id });
        for entry in &self.entries {
            match entry {
                Entry::Value(text) => items.push(Item::Value { level, text: text.clone() }),
                Entry::Field { name, value } => {
                    items.push(Item::Field { level, name: name.clone() });
                    items.push(Item::Value { level, text: value.clone() });
                }
                Entry::Block(block) => block.collect_items(level + 1, items),
            }
        }
    }
}

fn check_value(block: u64, text: &str) -> Result<()> {
    if memchr3(b'\n', b'}', b'\r', text.as_bytes()).is_some() {
        return Err(Error::build(format!(
            "block {}: value {:?} must not contain a line break or '}}'",
            block, text
        )));
    }
    Ok(())
}

/// A complete message: top-level blocks followed by a line break.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageBuilder {
    blocks: Vec<BlockBuilder>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(mut self, block: BlockBuilder) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn blocks(&self) -> &[BlockBuilder] {
        &self.blocks
    }

    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    pub fn write_to(&self, out: &mut String) -> Result<()> {
        for block in &self.blocks {
            block.write_to(out)?;
        }
        out.push('\n');
        Ok(())
    }

    /// Items the rendered message reads back as, ending with the message item.
    pub fn items(&self) -> Vec<Item> {
        let mut items = Vec::new();
        for block in &self.blocks {
            block.collect_items(1, &mut items);
        }
        items.push(Item::Message { level: 0 });
        items
    }
}

/// Render several messages as one stream.
pub fn render_messages(messages: &[MessageBuilder]) -> Result<String> {
    let mut out = String::new();
    for message in messages {
        message.write_to(&mut out)?;
    }
    Ok(out)
}
