use docs_markdown::{
    compile, compile_document, parse_inline, text_len, BlockStyle, EditOperation, StyleRange,
    TextRange,
};
use pretty_assertions::assert_eq;

fn insert(text: &str) -> EditOperation {
    EditOperation::InsertText {
        at_offset: 1,
        text: text.to_string(),
    }
}

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(start, end)
}

#[test]
fn should_style_heading_line() {
    // When
    let operations = compile("# Title\n");

    // Then
    assert_eq!(
        operations,
        vec![
            insert("Title\n"),
            EditOperation::SetParagraphStyle {
                range: range(1, 7),
                style: BlockStyle::Heading1,
            },
        ]
    );
}

#[test]
fn should_emit_bullet_before_emphasis() {
    // When
    let operations = compile("- **a** b");

    // Then
    assert_eq!(
        operations,
        vec![
            insert("a b\n"),
            EditOperation::SetBullet { range: range(1, 5) },
            EditOperation::SetTextEmphasis {
                range: range(1, 2),
                bold: true,
                italic_or_code: false,
            },
        ]
    );
}

#[test]
fn should_split_heading_on_lone_carriage_return() {
    // When
    let compiled = compile_document("# A\rb");

    // Then
    assert_eq!(compiled.text, "A\nb\n");
    assert_eq!(
        compiled.ranges,
        vec![StyleRange::ParagraphStyle {
            range: range(1, 3),
            style: BlockStyle::Heading1,
        }]
    );
}

#[test]
fn should_split_on_unicode_line_separator() {
    // When
    let compiled = compile_document("- a\u{2028}b\r\n");

    // Then
    assert_eq!(compiled.text, "a\nb\n");
    assert_eq!(
        compiled.ranges,
        vec![StyleRange::Bullet { range: range(1, 3) }]
    );
}

#[test]
fn should_return_nothing_for_empty_input() {
    assert!(compile("").is_empty());
}

#[test]
fn should_absorb_unterminated_emphasis() {
    // Given
    let spans = parse_inline("*unterminated");

    // Then
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].text, "unterminated");
    assert!(spans[0].italic_or_code);

    // And: the compiler formats the whole line without failing
    assert_eq!(
        compile("*unterminated"),
        vec![
            insert("unterminated\n"),
            EditOperation::SetTextEmphasis {
                range: range(1, 13),
                bold: false,
                italic_or_code: true,
            },
        ]
    );
}

#[test]
fn should_reserve_terminator_for_blank_line() {
    // When
    let compiled = compile_document("first\n\nsecond");

    // Then
    assert_eq!(compiled.text, "first\n\nsecond\n");
    assert!(compiled.ranges.is_empty());
    assert_eq!(
        compile("first\n\nsecond"),
        vec![insert("first\n\nsecond\n")]
    );
}

#[test]
fn should_order_operations_block_by_block() {
    // Given
    let markdown = "# Plan\n\n## Steps\n- first `step`\n* *second*\nDone **now**.\n";

    // When
    let operations = compile(markdown);

    // Then
    assert_eq!(
        operations,
        vec![
            insert("Plan\n\nSteps\nfirst step\nsecond\nDone now.\n"),
            EditOperation::SetParagraphStyle {
                range: range(1, 6),
                style: BlockStyle::Heading1,
            },
            EditOperation::SetParagraphStyle {
                range: range(7, 13),
                style: BlockStyle::Heading2,
            },
            EditOperation::SetBullet {
                range: range(13, 24),
            },
            EditOperation::SetTextEmphasis {
                range: range(19, 23),
                bold: false,
                italic_or_code: true,
            },
            EditOperation::SetBullet {
                range: range(24, 31),
            },
            EditOperation::SetTextEmphasis {
                range: range(24, 30),
                bold: false,
                italic_or_code: true,
            },
            EditOperation::SetTextEmphasis {
                range: range(36, 39),
                bold: true,
                italic_or_code: false,
            },
        ]
    );
}

#[test]
fn should_keep_every_range_inside_the_blob() {
    // Given
    let markdown = "# Überschrift 😀\n- **fett** und *kursiv*\n\n### `code` ✓\nplain 日本語 **strong\n";

    // When
    let compiled = compile_document(markdown);
    let limit = text_len(&compiled.text) + 1;

    // Then
    for style in &compiled.ranges {
        let r = style.range();
        assert!(0 < r.start && r.start < r.end && r.end <= limit, "{r} out of bounds");
    }

    let block_ranges: Vec<TextRange> = compiled
        .ranges
        .iter()
        .filter_map(|style| match style {
            StyleRange::ParagraphStyle { range, .. } => Some(*range),
            _ => None,
        })
        .collect();
    for (i, a) in block_ranges.iter().enumerate() {
        for b in &block_ranges[i + 1..] {
            assert!(!a.overlaps(b), "{a} overlaps {b}");
        }
    }
}

#[test]
fn should_nest_emphasis_inside_its_block() {
    // Given
    let compiled = compile_document("intro\n- a *b* c\n");

    // When
    let bullet = compiled
        .ranges
        .iter()
        .find(|style| matches!(style, StyleRange::Bullet { .. }))
        .map(StyleRange::range)
        .unwrap();
    let emphasis = compiled
        .ranges
        .iter()
        .find(|style| matches!(style, StyleRange::TextEmphasis { .. }))
        .map(StyleRange::range)
        .unwrap();

    // Then
    assert_eq!(bullet, range(7, 13));
    assert_eq!(emphasis, range(9, 10));
    assert!(bullet.contains(&emphasis));
}

#[test]
fn should_be_deterministic() {
    let markdown = "## Again\n- *x*\n";
    assert_eq!(compile(markdown), compile(markdown));
}
