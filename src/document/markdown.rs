//! Markdown → HTML conversion for document bodies.
//!
//! Uses pulldown-cmark with the GFM-style extensions most blog posts lean on
//! (tables, strikethrough, footnotes, task lists). Raw HTML blocks pass
//! through unchanged per CommonMark. The conversion is pure: the same input
//! always yields the same HTML.

use pulldown_cmark::{Options, Parser, html::push_html};

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
}

/// Render markdown to an HTML fragment with surrounding whitespace trimmed.
pub fn render_markdown(content: &str) -> String {
    let parser = Parser::new_ext(content, options());

    let mut html = String::with_capacity(content.len() * 2);
    push_html(&mut html, parser);

    let trimmed = html.trim();
    if trimmed.len() == html.len() {
        html
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph() {
        assert_eq!(render_markdown("Hello"), "<p>Hello</p>");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(render_markdown("\n\n  Hello\n\n"), "<p>Hello</p>");
        assert_eq!(render_markdown(""), "");
    }

    #[test]
    fn test_headings_and_emphasis() {
        let html = render_markdown("# Title\n\nsome *em* and **strong**");
        assert!(html.starts_with("<h1>Title</h1>"));
        assert!(html.contains("<em>em</em>"));
        assert!(html.contains("<strong>strong</strong>"));
    }

    #[test]
    fn test_extensions_enabled() {
        let html = render_markdown("~~gone~~\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_fenced_code_is_escaped() {
        let html = render_markdown("```\n<b>x</b>\n```");
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
    }

    #[test]
    fn test_deterministic() {
        let input = "- one\n- two\n\n> quote";
        assert_eq!(render_markdown(input), render_markdown(input));
    }
}
