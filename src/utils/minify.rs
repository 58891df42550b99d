//! HTML minification for rendered output.
//!
//! Returns `Cow::Borrowed` when minification is disabled so the common path
//! never copies the rendered page.

use crate::config::BuildConfig;
use std::borrow::Cow;

/// Minify `html` if `[build.minify]` is on.
pub fn minify<'a>(html: &'a [u8], build: &BuildConfig) -> Cow<'a, [u8]> {
    if build.minify {
        Cow::Owned(minify_html(html))
    } else {
        Cow::Borrowed(html)
    }
}

/// Minify HTML content using `minify_html` crate.
pub fn minify_html(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(html, &cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(minify: bool) -> BuildConfig {
        BuildConfig {
            minify,
            ..BuildConfig::default()
        }
    }

    #[test]
    fn test_minify_strips_whitespace() {
        let html = b"<html>\n  <head>\n  </head>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>";
        let result = minify(html, &build(true));
        let result_str = String::from_utf8_lossy(&result);

        assert!(!result_str.contains("\n  "));
        assert!(result_str.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_minify_drops_comments() {
        let result = minify_html(b"<p>a</p><!-- note --><p>b</p>");
        assert!(!String::from_utf8_lossy(&result).contains("note"));
    }

    #[test]
    fn test_minify_disabled_borrows() {
        let html = b"<html>\n  <body>\n  </body>\n</html>";
        let result = minify(html, &build(false));

        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, html);
    }
}
