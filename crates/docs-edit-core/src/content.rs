use std::io::{self, Read};
use std::path::PathBuf;

use crate::error::{EditError, EditResult};

/// Where markdown content for a document comes from.
#[derive(Debug, Clone)]
pub enum ContentSource {
    File(PathBuf),
    Stdin,
    /// Command-line text with `\n`, `\t`, `\\` and `\"` escapes.
    Inline(String),
}

pub fn load_content(source: ContentSource) -> EditResult<String> {
    let raw = match source {
        ContentSource::File(path) => std::fs::read_to_string(&path).map_err(|err| {
            EditError::InvalidContent(format!(
                "failed to read content file '{}': {err}",
                path.display()
            ))
        })?,
        ContentSource::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(|err| {
                EditError::InvalidContent(format!("failed to read content from stdin: {err}"))
            })?;
            buffer
        }
        ContentSource::Inline(raw) => unescape_inline(&raw)?,
    };

    Ok(strip_bom(raw))
}

fn strip_bom(content: String) -> String {
    match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    }
}

fn unescape_inline(raw: &str) -> EditResult<String> {
    let mut chars = raw.chars();
    let mut output = String::with_capacity(raw.len());

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }

        let Some(next) = chars.next() else {
            return Err(EditError::InvalidContent(
                "unterminated escape sequence".to_string(),
            ));
        };

        match next {
            'n' => output.push('\n'),
            't' => output.push('\t'),
            '\\' => output.push('\\'),
            '"' => output.push('"'),
            _ => {
                return Err(EditError::InvalidContent(format!(
                    "unsupported escape sequence: \\{next}"
                )))
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unescapes_inline_content() {
        let parsed = unescape_inline("# Title\\n- item\\t\\\\\"").unwrap();
        assert_eq!(parsed, "# Title\n- item\t\\\"");
    }

    #[test]
    fn rejects_unknown_escape() {
        let err = unescape_inline("Hello\\rWorld").unwrap_err();
        assert!(matches!(err, EditError::InvalidContent(_)));
    }

    #[test]
    fn rejects_trailing_backslash() {
        assert!(unescape_inline("oops\\").is_err());
    }

    #[test]
    fn reads_file_and_drops_byte_order_mark() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "\u{feff}# Notes\n").unwrap();

        let content = load_content(ContentSource::File(path)).unwrap();
        assert_eq!(content, "# Notes\n");
    }

    #[test]
    fn missing_file_is_invalid_content() {
        let dir = tempdir().unwrap();
        let err = load_content(ContentSource::File(dir.path().join("absent.md"))).unwrap_err();
        assert!(err.to_string().contains("absent.md"));
    }
}
