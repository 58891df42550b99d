//! Source document parsing.
//!
//! A source document is a metadata block, a separator line, then a markdown
//! body:
//!
//! ```text
//! Title: Hello
//! Author: Alice
//! Date: 9 January 2015 @ 10:30pm
//! ---
//! The *body* starts here.
//! ```
//!
//! # Metadata grammar
//!
//! Each metadata line is tested against the configured prefixes in a fixed
//! priority order (title, author, tag, template, date). The first prefix the
//! line starts with claims it; the value is the rest of the line, trimmed.
//! Lines matching no prefix are dropped. A later line for the same field
//! replaces an earlier one.
//!
//! A `Date:` value that does not parse with the configured format is ignored
//! and the caller's fallback date stays in effect.

use super::{Document, Metadata, date::parse_date, markdown::render_markdown};
use crate::config::MetaConfig;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors that prevent a document from being parsed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no `{marker}` line separating metadata from body")]
    MissingBodyMarker { marker: String },

    #[error("document is not valid UTF-8")]
    InvalidUtf8,
}

/// Parse raw document bytes into a [`Document`].
///
/// `fallback` becomes the effective date unless the metadata block carries a
/// parseable date.
pub fn parse_document(
    raw: &[u8],
    fallback: NaiveDateTime,
    rules: &MetaConfig,
) -> Result<Document, ParseError> {
    let content = std::str::from_utf8(raw).map_err(|_| ParseError::InvalidUtf8)?;

    let (head, body) =
        split_body(content, &rules.separator).ok_or_else(|| ParseError::MissingBodyMarker {
            marker: rules.separator.clone(),
        })?;

    let meta = parse_metadata(head, rules);
    let date = meta
        .date
        .as_deref()
        .and_then(|value| parse_date(value, &rules.date_format))
        .unwrap_or(fallback);

    Ok(Document {
        meta,
        date,
        body: render_markdown(body),
    })
}

/// Split at the first line equal to `marker` (trailing whitespace ignored).
///
/// Returns the text before that line and the text after it.
fn split_body<'a>(content: &'a str, marker: &str) -> Option<(&'a str, &'a str)> {
    let marker = marker.trim_end();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let end = offset + line.len();
        if line.trim_end() == marker {
            return Some((&content[..offset], &content[end..]));
        }
        offset = end;
    }

    None
}

fn parse_metadata(head: &str, rules: &MetaConfig) -> Metadata {
    let mut meta = Metadata::default();

    for line in head.lines() {
        let Some((field, value)) = match_prefix(line, rules) else {
            continue;
        };
        let value = Some(value.to_owned());
        match field {
            Field::Title => meta.title = value,
            Field::Author => meta.author = value,
            Field::Tag => meta.tag = value,
            Field::Template => meta.template = value,
            Field::Date => meta.date = value,
        }
    }

    meta
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Author,
    Tag,
    Template,
    Date,
}

/// First prefix (in priority order) the line starts with, and the trimmed value.
fn match_prefix<'a>(line: &'a str, rules: &MetaConfig) -> Option<(Field, &'a str)> {
    let prefixes = [
        (Field::Title, rules.title.as_str()),
        (Field::Author, rules.author.as_str()),
        (Field::Tag, rules.tag.as_str()),
        (Field::Template, rules.template.as_str()),
        (Field::Date, rules.date.as_str()),
    ];

    prefixes.into_iter().find_map(|(field, prefix)| {
        line.strip_prefix(prefix).map(|rest| (field, rest.trim()))
    })
}
