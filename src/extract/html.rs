//! Pattern-based HTML tag stripping.

use std::sync::OnceLock;

use regex::Regex;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn whitespace_regex() -> &'static Regex {
    static WS: OnceLock<Regex> = OnceLock::new();
    WS.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Replace every tag with a space, then collapse whitespace runs.
///
/// Entities are left as-is.
pub fn strip_html(html: &str) -> String {
    let text = tag_regex().replace_all(html, " ");
    whitespace_regex().replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_simple_document() {
        let html = "<html><body><h1>Hello</h1><p>world</p></body></html>";
        assert_eq!(strip_html(html), "Hello world");
    }

    #[test]
    fn test_strip_attributes_and_newlines() {
        let html = "<div class=\"a\">\n  one\n</div>\n<span data-x='1'>two</span>";
        assert_eq!(strip_html(html), "one two");
    }

    #[test]
    fn test_strip_plain_text_is_unchanged() {
        assert_eq!(strip_html("no tags here"), "no tags here");
    }
}
