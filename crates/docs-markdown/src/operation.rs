use std::fmt;

use serde::Serialize;

use crate::block::BlockStyle;

/// Half-open range `[start, end)` of 1-based document offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "empty range {start}..{end}");
        Self { start, end }
    }

    /// Range starting at `start` spanning `len` units; `None` when `len` is 0.
    pub fn with_len(start: usize, len: usize) -> Option<Self> {
        (len > 0).then(|| Self::new(start, start + len))
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn overlaps(&self, other: &TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Formatting produced while walking blocks, before it becomes an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StyleRange {
    ParagraphStyle {
        range: TextRange,
        style: BlockStyle,
    },
    Bullet {
        range: TextRange,
    },
    TextEmphasis {
        range: TextRange,
        bold: bool,
        italic_or_code: bool,
    },
}

impl StyleRange {
    pub fn range(&self) -> TextRange {
        match self {
            StyleRange::ParagraphStyle { range, .. }
            | StyleRange::Bullet { range }
            | StyleRange::TextEmphasis { range, .. } => *range,
        }
    }
}

/// One unit of the remote batch-update protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    InsertText {
        at_offset: usize,
        text: String,
    },
    SetParagraphStyle {
        range: TextRange,
        style: BlockStyle,
    },
    SetBullet {
        range: TextRange,
    },
    SetTextEmphasis {
        range: TextRange,
        bold: bool,
        italic_or_code: bool,
    },
}

impl EditOperation {
    /// Range the operation formats; `None` for insertions.
    pub fn range(&self) -> Option<TextRange> {
        match self {
            EditOperation::InsertText { .. } => None,
            EditOperation::SetParagraphStyle { range, .. }
            | EditOperation::SetBullet { range }
            | EditOperation::SetTextEmphasis { range, .. } => Some(*range),
        }
    }
}

impl From<StyleRange> for EditOperation {
    fn from(style: StyleRange) -> Self {
        match style {
            StyleRange::ParagraphStyle { range, style } => {
                EditOperation::SetParagraphStyle { range, style }
            }
            StyleRange::Bullet { range } => EditOperation::SetBullet { range },
            StyleRange::TextEmphasis {
                range,
                bold,
                italic_or_code,
            } => EditOperation::SetTextEmphasis {
                range,
                bold,
                italic_or_code,
            },
        }
    }
}
