use serde::Serialize;

use crate::block::{parse_blocks, BlockSegment};
use crate::operation::{EditOperation, StyleRange, TextRange};

/// Offset of the first character of a document body.
pub const BODY_START: usize = 1;

const LINE_TERMINATOR: char = '\n';

/// Length of `text` in the unit the target document indexes with (UTF-16
/// code units). Byte length is never a valid offset.
pub fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Blob plus the ranges that format it, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledDocument {
    pub text: String,
    pub ranges: Vec<StyleRange>,
}

impl CompiledDocument {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Offset one past the last inserted unit.
    pub fn end_offset(&self) -> usize {
        BODY_START + text_len(&self.text)
    }

    /// The insertion of the whole blob first, then every range in order.
    pub fn into_operations(self) -> Vec<EditOperation> {
        if self.text.is_empty() {
            return Vec::new();
        }

        let mut operations = Vec::with_capacity(self.ranges.len() + 1);
        operations.push(EditOperation::InsertText {
            at_offset: BODY_START,
            text: self.text,
        });
        operations.extend(self.ranges.into_iter().map(EditOperation::from));
        operations
    }
}

/// Running state threaded through the block walk.
struct Accumulator {
    offset: usize,
    text: String,
    ranges: Vec<StyleRange>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            offset: BODY_START,
            text: String::new(),
            ranges: Vec::new(),
        }
    }

    fn push_block(mut self, block: &BlockSegment) -> Self {
        let block_start = self.offset;
        let mut rendered = block.text();
        rendered.push(LINE_TERMINATOR);
        let rendered_len = text_len(&rendered);

        // Every rendered block holds at least its terminator.
        let block_range = TextRange::new(block_start, block_start + rendered_len);

        if !block.style.is_body() {
            self.ranges.push(StyleRange::ParagraphStyle {
                range: block_range,
                style: block.style,
            });
        }

        if block.list_item {
            self.ranges.push(StyleRange::Bullet { range: block_range });
        }

        let mut span_start = block_start;
        for span in &block.spans {
            let span_len = text_len(&span.text);
            if span.is_emphasized() {
                if let Some(range) = TextRange::with_len(span_start, span_len) {
                    self.ranges.push(StyleRange::TextEmphasis {
                        range,
                        bold: span.bold,
                        italic_or_code: span.italic_or_code,
                    });
                }
            }
            span_start += span_len;
        }

        self.text.push_str(&rendered);
        self.offset += rendered_len;
        self
    }

    fn finish(self) -> CompiledDocument {
        CompiledDocument {
            text: self.text,
            ranges: self.ranges,
        }
    }
}

/// Build the blob and its formatting ranges from already parsed blocks.
pub fn compile_blocks(blocks: &[BlockSegment]) -> CompiledDocument {
    blocks
        .iter()
        .fold(Accumulator::new(), Accumulator::push_block)
        .finish()
}

/// Compile a markdown document into blob text and formatting ranges.
pub fn compile_document(markdown: &str) -> CompiledDocument {
    compile_blocks(&parse_blocks(markdown))
}

/// Compile a markdown document into the ordered edit operations that
/// reproduce it in an empty document body.
pub fn compile(markdown: &str) -> Vec<EditOperation> {
    compile_document(markdown).into_operations()
}
