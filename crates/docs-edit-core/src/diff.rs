use similar::TextDiff;

/// Unified diff between the current and proposed markdown of a document.
pub fn build_unified_diff(current: &str, proposed: &str, document_id: &str) -> Option<String> {
    if current == proposed {
        return None;
    }

    let diff = TextDiff::from_lines(current, proposed);
    let header_old = format!("a/{document_id}");
    let header_new = format!("b/{document_id}");
    let rendered = diff
        .unified_diff()
        .header(&header_old, &header_new)
        .to_string();

    Some(rendered)
}
