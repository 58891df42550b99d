//! Template lookup and execution.
//!
//! Templates are read from disk on every render, so edits to a template take
//! effect on the next cycle without restarting anything. Each render gets a
//! fresh [`Tera`] instance holding exactly one template.
//!
//! Autoescaping is off. Metadata fields are HTML-escaped when they are bound;
//! the body is already HTML and is bound as-is. [`tera::escape_html`] also
//! encodes `/` as `&#x2F;`, so `AC/DC` or a date like `2015/01/09` shows up
//! encoded in the page source while browsers display it unchanged.

use crate::{
    config::{BuildConfig, join_with_ext},
    document::Formatter,
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tera::{Context, Tera};
use thiserror::Error;

/// Errors from loading or executing a template.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template not found: {}", path.display())]
    TemplateNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to execute template {}", path.display())]
    ExecutionFailed {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },
}

/// Values exposed to a template.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bindings<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub tag: &'a str,
    pub template: &'a str,
    pub date: &'a str,
    /// Trusted HTML, bound without escaping.
    pub body: &'a str,
}

impl Bindings<'_> {
    fn to_context(self) -> Context {
        let mut context = Context::new();
        context.insert("title", &tera::escape_html(self.title));
        context.insert("author", &tera::escape_html(self.author));
        context.insert("tag", &tera::escape_html(self.tag));
        context.insert("template", &tera::escape_html(self.template));
        context.insert("date", &tera::escape_html(self.date));
        context.insert("body", self.body);
        context
    }
}

/// Load the template at `path` and execute it against `bindings`.
pub fn execute(path: &Path, bindings: &Bindings<'_>) -> Result<Vec<u8>, RenderError> {
    let source = fs::read_to_string(path).map_err(|source| RenderError::TemplateNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let failed = |source| RenderError::ExecutionFailed {
        path: path.to_path_buf(),
        source,
    };

    let name = path.to_string_lossy();
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_template(&name, &source).map_err(failed)?;

    let html = tera.render(&name, &bindings.to_context()).map_err(failed)?;
    Ok(html.into_bytes())
}

// ============================================================================
// Template resolution
// ============================================================================

/// Maps template names to files under the template directory.
#[derive(Debug, Clone)]
pub struct Templates {
    dir: PathBuf,
    ext: String,
    default: String,
}

impl Templates {
    pub fn from_config(build: &BuildConfig) -> Self {
        Self {
            dir: build.templates.clone(),
            ext: build.template_ext.clone(),
            default: build.default_template.clone(),
        }
    }

    /// Path for `name`, or for the default template when no name is given.
    pub fn resolve(&self, name: Option<&str>) -> PathBuf {
        let name = name.filter(|n| !n.is_empty()).unwrap_or(&self.default);
        join_with_ext(&self.dir, name, &self.ext)
    }

    /// Resolve the template `document` asks for and format it.
    pub fn render<F: Formatter>(
        &self,
        formatter: &F,
        document: &F::Document,
    ) -> Result<Vec<u8>, RenderError> {
        let path = self.resolve(formatter.template_name(document));
        formatter.format(document, &path)
    }
}
