//! Markdown to document edit operations.
//!
//! A document is split into one block per line, each block is scanned for
//! inline emphasis, and a single forward pass turns the blocks into one
//! text blob plus formatting ranges addressed by 1-based offsets into it.

pub mod block;
pub mod compile;
pub mod inline;
pub mod operation;

pub use block::{classify_line, parse_blocks, split_lines, BlockSegment, BlockStyle, LineClass};
pub use compile::{
    compile, compile_blocks, compile_document, text_len, CompiledDocument, BODY_START,
};
pub use inline::{parse_inline, InlineSpan};
pub use operation::{EditOperation, StyleRange, TextRange};
