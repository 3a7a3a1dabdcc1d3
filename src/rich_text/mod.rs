// src/rich_text/mod.rs
//! Structured rich-text model used for `structured` documents.
//!
//! Formatting state (bold, current block type, font size, ...) is read from
//! the model rather than re-derived from rendered markup.
pub mod format;
pub mod model;
pub mod render;

pub use format::{FormatState, Position, Selection};
pub use model::{
    BlockStyles, BlockType, DocumentStyles, InlineStyles, Mark, RichDocument, TextAlign, TextBlock,
    TextSpan,
};
pub use render::{from_plain_text, to_html, to_plain_text};
