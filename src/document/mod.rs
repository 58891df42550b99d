//! Parsed documents and the formatter abstraction.
//!
//! # Architecture
//!
//! ```text
//! raw bytes ──► Formatter::parse ──► Document ──► Formatter::format ──► output bytes
//!                  (metadata +                       (template file
//!                   markdown body)                    + bound fields)
//! ```
//!
//! [`Formatter`] is the seam for alternate source formats: the pipeline only
//! needs to parse bytes into something it can later format with a template,
//! date, and name a template for. [`PostFormatter`] is the markdown +
//! metadata-block implementation.

pub mod date;
pub mod markdown;
pub mod parser;

pub use parser::ParseError;

use crate::{
    config::MetaConfig,
    render::{self, Bindings, RenderError},
};
use chrono::NaiveDateTime;
use std::{fmt, path::Path};

// ============================================================================
// Document
// ============================================================================

/// Metadata fields recognized in a document's header block.
///
/// Every field is optional. `date` holds the raw value as written; whether
/// it parsed is reflected in [`Document::date`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub tag: Option<String>,
    pub template: Option<String>,
    pub date: Option<String>,
}

/// One parsed source document.
///
/// Lives for a single render pass: built by the parser, consumed by the
/// renderer, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub meta: Metadata,
    /// Effective date: the explicit `Date:` value if it parsed, otherwise the
    /// source file's modification time.
    pub date: NaiveDateTime,
    /// Rendered HTML fragment, never raw markdown.
    pub body: String,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", text(&self.meta.title))?;
        writeln!(f, "Author: {}", text(&self.meta.author))?;
        writeln!(f, "Tag: {}", text(&self.meta.tag))?;
        writeln!(f, "Date: {}", self.date.format(date::ISO_FORMAT))?;
        writeln!(f)?;
        write!(f, "{}", self.body)
    }
}

// ============================================================================
// Formatter
// ============================================================================

/// A source format the pipeline can parse and render.
pub trait Formatter {
    /// Parsed form of one source file. `Display` gives a plain-text summary.
    type Document: fmt::Display;

    /// Parse raw source bytes. `fallback` is the date to use when the source
    /// does not carry a usable one (the file's modification time).
    fn parse(&self, raw: &[u8], fallback: NaiveDateTime) -> Result<Self::Document, ParseError>;

    /// Load the template at `template` and execute it against `document`.
    fn format(&self, document: &Self::Document, template: &Path) -> Result<Vec<u8>, RenderError>;

    /// The document's effective date, formatted for display.
    fn date(&self, document: &Self::Document) -> String;

    /// Template the document asks for, if any.
    fn template_name<'a>(&self, document: &'a Self::Document) -> Option<&'a str>;
}

/// Markdown documents with a prefixed metadata block.
#[derive(Debug, Clone, Default)]
pub struct PostFormatter {
    rules: MetaConfig,
}

impl PostFormatter {
    pub const fn new(rules: MetaConfig) -> Self {
        Self { rules }
    }
}

impl Formatter for PostFormatter {
    type Document = Document;

    fn parse(&self, raw: &[u8], fallback: NaiveDateTime) -> Result<Document, ParseError> {
        parser::parse_document(raw, fallback, &self.rules)
    }

    fn format(&self, document: &Document, template: &Path) -> Result<Vec<u8>, RenderError> {
        let date = self.date(document);
        let bindings = Bindings {
            title: text(&document.meta.title),
            author: text(&document.meta.author),
            tag: text(&document.meta.tag),
            template: text(&document.meta.template),
            date: &date,
            body: &document.body,
        };

        render::execute(template, &bindings)
    }

    fn date(&self, document: &Document) -> String {
        date::format_date(&document.date, &self.rules.date_format)
    }

    fn template_name<'a>(&self, document: &'a Document) -> Option<&'a str> {
        document
            .meta
            .template
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}

/// Absent fields bind as empty strings.
fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    fn formatter() -> PostFormatter {
        PostFormatter::new(MetaConfig {
            date_format: "%Y-%m-%d".into(),
            ..MetaConfig::default()
        })
    }

    fn fallback() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2001, 2, 3)
            .unwrap()
            .and_hms_opt(4, 5, 6)
            .unwrap()
    }

    #[test]
    fn test_parse_and_date() {
        let f = formatter();
        let doc = f.parse(b"Title: A\nDate: 2015-01-09\n---\nHello", fallback()).unwrap();

        assert_eq!(f.date(&doc), "2015-01-09");
        assert_eq!(f.template_name(&doc), None);
    }

    #[test]
    fn test_template_name_ignores_empty_value() {
        let f = formatter();
        let doc = f.parse(b"Template:   \n---\n", fallback()).unwrap();
        assert_eq!(f.template_name(&doc), None);

        let doc = f.parse(b"Template: custom\n---\n", fallback()).unwrap();
        assert_eq!(f.template_name(&doc), Some("custom"));
    }

    #[test]
    fn test_display_summary() {
        let f = formatter();
        let doc = f.parse(b"Title: A\nAuthor: B\nTag: C\n---\nHello", fallback()).unwrap();

        assert_eq!(
            doc.to_string(),
            "Title: A\nAuthor: B\nTag: C\nDate: 2001-02-03 04:05:06\n\n<p>Hello</p>"
        );
    }

    #[test]
    fn test_format_binds_fields() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("post.html");
        fs::write(
            &template,
            "<h1>{{ title }}</h1><p>{{ author }}|{{ tag }}|{{ date }}</p>{{ body }}",
        )
        .unwrap();

        let f = formatter();
        let doc = f
            .parse(b"Title: A & B\nAuthor: B\nTag: C\nDate: 2015-01-09\n---\nHello", fallback())
            .unwrap();
        let out = String::from_utf8(f.format(&doc, &template).unwrap()).unwrap();

        assert_eq!(
            out,
            "<h1>A &amp; B</h1><p>B|C|2015-01-09</p><p>Hello</p>"
        );
    }
}
