use std::fmt;

use serde::Serialize;

use crate::inline::{parse_inline, InlineSpan};

/// Paragraph-level style of a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum BlockStyle {
    Heading1,
    Heading2,
    Heading3,
    #[default]
    Body,
}

impl BlockStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockStyle::Heading1 => "heading-1",
            BlockStyle::Heading2 => "heading-2",
            BlockStyle::Heading3 => "heading-3",
            BlockStyle::Body => "body",
        }
    }

    pub fn is_body(self) -> bool {
        self == BlockStyle::Body
    }
}

impl fmt::Display for BlockStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural role of a raw line, decided from its prefix alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineClass<'a> {
    pub style: BlockStyle,
    pub list_item: bool,
    /// Text left after the prefix, still carrying inline markup.
    pub content: &'a str,
}

/// One source line after classification and inline parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSegment {
    pub spans: Vec<InlineSpan>,
    pub style: BlockStyle,
    pub list_item: bool,
}

impl BlockSegment {
    pub fn from_line(line: &str) -> Self {
        let class = classify_line(line);
        let spans = if line.trim().is_empty() {
            vec![InlineSpan::plain("")]
        } else {
            parse_inline(class.content)
        };

        Self {
            spans,
            style: class.style,
            list_item: class.list_item,
        }
    }

    /// Block text as it appears in the document, without the terminator.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

const PREFIXES: &[(&str, BlockStyle, bool)] = &[
    ("# ", BlockStyle::Heading1, false),
    ("## ", BlockStyle::Heading2, false),
    ("### ", BlockStyle::Heading3, false),
    ("- ", BlockStyle::Body, true),
    ("* ", BlockStyle::Body, true),
];

/// Classify a raw line. Checked in priority order; the first match wins.
pub fn classify_line(line: &str) -> LineClass<'_> {
    for (prefix, style, list_item) in PREFIXES {
        if let Some(content) = line.strip_prefix(prefix) {
            return LineClass {
                style: *style,
                list_item: *list_item,
                content,
            };
        }
    }

    if line.trim().is_empty() {
        return LineClass {
            style: BlockStyle::Body,
            list_item: false,
            content: "",
        };
    }

    LineClass {
        style: BlockStyle::Body,
        list_item: false,
        content: line,
    }
}

fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}

/// Split on every line boundary: `\n`, `\r`, `\r\n`, vertical tab, form
/// feed, the file/group/record separators, NEL and the Unicode line and
/// paragraph separators. A final terminator does not open an extra line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !is_line_break(ch) {
            continue;
        }
        lines.push(&text[start..idx]);
        let mut end = idx + ch.len_utf8();
        if ch == '\r' && matches!(chars.peek(), Some((_, '\n'))) {
            chars.next();
            end += 1;
        }
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Split a document into one block per line.
pub fn parse_blocks(markdown: &str) -> Vec<BlockSegment> {
    split_lines(markdown)
        .into_iter()
        .map(BlockSegment::from_line)
        .collect()
}
