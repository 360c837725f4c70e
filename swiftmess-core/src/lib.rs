//! SWIFT Message Core Parser
//!
//! Streaming parser for messages in the nested block/field/value text
//! format of SWIFT (EDIFACT / ISO 15022 style):
//!
//! ```text
//! {1:F01BANKBEBBAXXX0000999999}{2:O5981519051128...}{3:{108:REF}}{4:
//! :20:99990212189999
//! :77E:/TREF XXXXXXXXXXXXXXXX
//! /NOIM 000000
//! -}
//! ```
//!
//! Raw characters flow one way: tokenizer → items → grouper → groups →
//! field mappers. Every stage is lazy and single-pass.
//!
//! # Architecture
//!
//! - **machine.rs** - Six-state tokenizer state machine, one character per step
//! - **tokenizer.rs** - Pull-mode iterator over a character source
//! - **streaming.rs** - Item ring buffer, push-mode tokenizer fed with chunks
//! - **grouper.rs** - Folds items into block/field/values groups
//! - **builder.rs** - Renders well-formed messages and their expected items
//! - **mapping.rs** - Report mappers keyed by report type, value conversions
//! - **item.rs** / **span.rs** / **error.rs** / **options.rs** - Shared types

pub mod builder;
pub mod error;
pub mod grouper;
pub mod item;
pub mod machine;
pub mod mapping;
pub mod options;
pub mod source;
pub mod span;
pub mod streaming;
pub mod tokenizer;

pub use builder::{BlockBuilder, Entry, MessageBuilder};
pub use error::{Error, ParseError, ParseErrorCode, Result};
pub use grouper::{group_str, Group, GroupItems, Grouper, Messages};
pub use item::{block_name, Item, ItemKind};
pub use machine::{Machine, State, StateName};
pub use mapping::{Amount, FieldValue, Locator, MapperRegistry, Record, Report, ReportMapper};
pub use options::Options;
pub use source::{CharSource, ReadSource, StrSource};
pub use span::Location;
pub use streaming::{FeedResult, ItemRing, StreamingTokenizer};
pub use tokenizer::{message_items, parse_str, Tokenizer};
