use std::sync::OnceLock;

use regex::{Captures, Regex};

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?P<bang>!?)\[(?P<text>[^\]]*)\]\((?P<target>[^)]*)\)").expect("link pattern")
    })
}

/// Convert an exported HTML document to markdown.
///
/// Link targets are dropped and their text kept; images are left intact.
pub fn html_to_markdown(html: &str) -> String {
    let markdown = html2md::parse_html(html);
    let without_links = link_pattern().replace_all(&markdown, |caps: &Captures| {
        if caps["bang"].is_empty() {
            caps["text"].to_string()
        } else {
            caps[0].to_string()
        }
    });

    let mut output = without_links
        .trim_start_matches('\n')
        .trim_end()
        .to_string();
    if !output.is_empty() {
        output.push('\n');
    }
    output
}
