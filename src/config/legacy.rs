//! Line-oriented config format.
//!
//! Older sites keep their settings as `label: value` lines instead of TOML:
//!
//! ```text
//! inputDir: posts
//! inputExt: .md
//! outputDir: static
//! outputExt: .html
//! templateDir: templates
//! templateExt: .html
//! defaultTem: default
//! titlePre: Title:
//! bodyPre: ---
//! dateFormat: %-d %B %Y @ %-I:%M%P
//! ```
//!
//! Only the label and the `": "` after it are stripped; the value is kept
//! verbatim so prefixes may carry trailing spaces.
//!
//! A `dateFormat` without any `%` is read as a Go reference layout
//! (`2 January 2006 @ 3:04pm`) and translated to strftime.

use super::{SiteConfig, error::ConfigError};

/// Parse line-oriented config content on top of the default config.
pub fn parse(content: &str) -> Result<SiteConfig, ConfigError> {
    let mut config = SiteConfig::default();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let lineno = index + 1;

        let (label, value) = line.split_once(':').ok_or_else(|| ConfigError::Legacy {
            line: lineno,
            message: format!("expected `label: value`, got `{line}`"),
        })?;
        let value = value.strip_prefix(' ').unwrap_or(value);

        apply(&mut config, label.trim(), value, lineno)?;
    }

    Ok(config)
}

fn apply(config: &mut SiteConfig, label: &str, value: &str, line: usize) -> Result<(), ConfigError> {
    let build = &mut config.build;
    let meta = &mut config.meta;

    match label {
        "inputDir" => build.source = value.into(),
        "inputExt" => build.source_ext = value.into(),
        "outputDir" => build.output = value.into(),
        "outputExt" => build.output_ext = value.into(),
        "templateDir" => build.templates = value.into(),
        "templateExt" => build.template_ext = value.into(),
        // An empty default template name keeps "default"
        "defaultTem" if value.trim().is_empty() => {}
        "defaultTem" => build.default_template = value.into(),
        "titlePre" => meta.title = value.into(),
        "authorPre" => meta.author = value.into(),
        "tagPre" => meta.tag = value.into(),
        "templatePre" => meta.template = value.into(),
        "datePre" => meta.date = value.into(),
        "bodyPre" => meta.separator = value.into(),
        "dateFormat" if value.contains('%') => meta.date_format = value.into(),
        "dateFormat" => meta.date_format = translate_go_layout(value),
        "interval" => config.watch.interval = parse_number(value, label, line)?,
        "port" => config.serve.port = parse_number(value, label, line)?,
        _ => {
            return Err(ConfigError::Legacy {
                line,
                message: format!("unknown label `{label}`"),
            });
        }
    }

    Ok(())
}

/// Render `config` as `label: value` lines that [`parse`] reads back.
///
/// Settings without a label (`minify`, `notify`, `interface`) are left out.
pub fn to_string(config: &SiteConfig) -> String {
    let build = &config.build;
    let meta = &config.meta;
    let lines = [
        ("inputDir", build.source.display().to_string()),
        ("inputExt", build.source_ext.clone()),
        ("outputDir", build.output.display().to_string()),
        ("outputExt", build.output_ext.clone()),
        ("templateDir", build.templates.display().to_string()),
        ("templateExt", build.template_ext.clone()),
        ("defaultTem", build.default_template.clone()),
        ("titlePre", meta.title.clone()),
        ("authorPre", meta.author.clone()),
        ("tagPre", meta.tag.clone()),
        ("templatePre", meta.template.clone()),
        ("datePre", meta.date.clone()),
        ("bodyPre", meta.separator.clone()),
        ("dateFormat", meta.date_format.clone()),
        ("interval", config.watch.interval.to_string()),
        ("port", config.serve.port.to_string()),
    ];

    lines
        .iter()
        .map(|(label, value)| format!("{label}: {value}\n"))
        .collect()
}

/// Go layout tokens and their strftime equivalents, longest match first.
const GO_LAYOUT: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Monday", "%A"),
    ("-07:00", "%:z"),
    ("-0700", "%z"),
    ("2006", "%Y"),
    ("Jan", "%b"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("01", "%m"),
    ("02", "%d"),
    ("_2", "%e"),
    ("06", "%y"),
    ("15", "%H"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("PM", "%p"),
    ("pm", "%P"),
    ("1", "%-m"),
    ("2", "%-d"),
    ("3", "%-I"),
    ("4", "%-M"),
    ("5", "%-S"),
];

/// Rewrite a Go reference layout as a chrono strftime format.
pub fn translate_go_layout(layout: &str) -> String {
    let mut out = String::with_capacity(layout.len() * 2);
    let mut rest = layout;

    'outer: while let Some(ch) = rest.chars().next() {
        for (token, conversion) in GO_LAYOUT {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(conversion);
                rest = tail;
                continue 'outer;
            }
        }
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }

    out
}

fn parse_number<T: std::str::FromStr>(value: &str, label: &str, line: usize) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Legacy {
        line,
        message: format!("`{label}` expects a number, got `{value}`"),
    })
}
