//! `[build]` section configuration.
//!
//! Directory and extension pairs for sources, outputs and templates.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `[build]` section in quire.toml.
///
/// # Example
/// ```toml
/// [build]
/// source = "posts"
/// source_ext = ".md"
/// output = "static"
/// output_ext = ".html"
/// templates = "templates"
/// template_ext = ".html"
/// default_template = "default"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Directory scanned for source documents (not recursed into).
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Suffix a file name must end with to count as a source document.
    #[serde(default = "defaults::build::source_ext")]
    #[educe(Default = defaults::build::source_ext())]
    pub source_ext: String,

    /// Directory rendered documents are written to.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    #[serde(default = "defaults::build::output_ext")]
    #[educe(Default = defaults::build::output_ext())]
    pub output_ext: String,

    /// Directory holding template files.
    #[serde(default = "defaults::build::templates")]
    #[educe(Default = defaults::build::templates())]
    pub templates: PathBuf,

    #[serde(default = "defaults::build::template_ext")]
    #[educe(Default = defaults::build::template_ext())]
    pub template_ext: String,

    /// Template used when a document names none.
    #[serde(default = "defaults::build::default_template")]
    #[educe(Default = defaults::build::default_template())]
    pub default_template: String,

    /// Minify rendered HTML before writing.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,
}

impl BuildConfig {
    /// Output path for a document name: `<output>/<name><output_ext>`.
    pub fn output_path(&self, name: &str) -> PathBuf {
        join_with_ext(&self.output, name, &self.output_ext)
    }

    /// Source path for a document name: `<source>/<name><source_ext>`.
    pub fn source_path(&self, name: &str) -> PathBuf {
        join_with_ext(&self.source, name, &self.source_ext)
    }
}

/// `dir/<name><ext>`, where `ext` is appended verbatim (it may hold several dots).
pub fn join_with_ext(dir: &Path, name: &str, ext: &str) -> PathBuf {
    dir.join(format!("{name}{ext}"))
}
