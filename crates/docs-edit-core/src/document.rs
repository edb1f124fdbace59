use std::sync::OnceLock;

use regex::Regex;

use crate::error::{EditError, EditResult};

const DOCUMENT_URL_PREFIX: &str = "https://docs.google.com/document/d/";

fn url_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("document id pattern"))
}

/// Extract a document id from a share URL, or take the input as the id.
pub fn parse_doc_id(doc_id_or_url: &str) -> EditResult<String> {
    let trimmed = doc_id_or_url.trim();
    if trimmed.is_empty() {
        return Err(EditError::InvalidArguments(
            "document id or URL must not be empty".to_string(),
        ));
    }

    let id = url_id_pattern()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    Ok(id.to_string())
}

pub fn document_url(id: &str) -> String {
    format!("{DOCUMENT_URL_PREFIX}{id}/edit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_edit_url() {
        let id = parse_doc_id("https://docs.google.com/document/d/1AbC-d_9/edit#heading=h.x").unwrap();
        assert_eq!(id, "1AbC-d_9");
    }

    #[test]
    fn passes_bare_id_through() {
        assert_eq!(parse_doc_id(" 1AbCdef ").unwrap(), "1AbCdef");
    }

    #[test]
    fn rejects_blank_reference() {
        assert!(matches!(
            parse_doc_id("   "),
            Err(EditError::InvalidArguments(_))
        ));
    }

    #[test]
    fn builds_edit_url() {
        assert_eq!(
            document_url("abc"),
            "https://docs.google.com/document/d/abc/edit"
        );
    }
}
