use serde::Serialize;

/// A contiguous run of text sharing the same emphasis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineSpan {
    pub text: String,
    pub bold: bool,
    pub italic_or_code: bool,
}

impl InlineSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic_or_code: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            italic_or_code: false,
        }
    }

    /// Italic and code spans share one flag; the target document renders both
    /// as italic text.
    pub fn italic_or_code(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic_or_code: true,
        }
    }

    pub fn is_emphasized(&self) -> bool {
        self.bold || self.italic_or_code
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Delimiter {
    Strong,
    Emphasis,
    Code,
}

impl Delimiter {
    fn detect(rest: &str) -> Option<Self> {
        if rest.starts_with("**") {
            Some(Self::Strong)
        } else if rest.starts_with('*') {
            Some(Self::Emphasis)
        } else if rest.starts_with('`') {
            Some(Self::Code)
        } else {
            None
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Self::Strong => "**",
            Self::Emphasis => "*",
            Self::Code => "`",
        }
    }

    fn span(self, text: &str) -> InlineSpan {
        match self {
            Self::Strong => InlineSpan::bold(text),
            Self::Emphasis | Self::Code => InlineSpan::italic_or_code(text),
        }
    }
}

/// Split one line (without its terminator) into inline spans.
///
/// The scan runs left to right without backtracking. An opening delimiter
/// with no matching closer absorbs the rest of the line, so every input
/// yields spans whose concatenated text equals the line minus delimiters.
pub fn parse_inline(line: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = line;

    while let Some(ch) = rest.chars().next() {
        let Some(delimiter) = Delimiter::detect(rest) else {
            plain.push(ch);
            rest = &rest[ch.len_utf8()..];
            continue;
        };

        flush_plain(&mut plain, &mut spans);

        let marker = delimiter.marker();
        let body = &rest[marker.len()..];
        let (text, remainder) = match body.find(marker) {
            Some(close) => (&body[..close], &body[close + marker.len()..]),
            // Unterminated: take everything up to end of line.
            None => (body, ""),
        };

        spans.push(delimiter.span(text));
        rest = remainder;
    }

    flush_plain(&mut plain, &mut spans);
    spans
}

fn flush_plain(plain: &mut String, spans: &mut Vec<InlineSpan>) {
    if !plain.is_empty() {
        spans.push(InlineSpan::plain(std::mem::take(plain)));
    }
}
