//! Scan cycles over the source directory.
//!
//! # Cycle
//!
//! ```text
//! list sources ──► filter (ChangeTracker) ──► per document, in listing order:
//!                                               read ─► parse ─► render ─► write ─► commit
//! ```
//!
//! A listing failure aborts the cycle before any document is touched. Any
//! failure inside the per-document sequence skips that document only: the
//! change record keeps its previous entry, so the document is retried on the
//! next cycle, and the remaining documents are still processed.
//!
//! Listing is non-recursive. Subdirectories are ignored, and so are entries
//! whose names are not valid UTF-8 or do not end in the source extension.
//! Order is whatever the filesystem enumeration yields.
//!
//! Removed sources are not cleaned up: their output files and change record
//! entries persist for the lifetime of the process.

use crate::{
    config::{BuildConfig, SiteConfig},
    document::{Formatter, ParseError, PostFormatter, date::from_system_time},
    log,
    render::{RenderError, Templates},
    tracker::{ChangeTracker, ScanMode},
    utils::minify::minify,
};
use std::{
    error::Error as StdError,
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};
use thiserror::Error;

// ============================================================================
// Errors and reports
// ============================================================================

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fatal to the whole cycle.
    #[error("cannot list source directory {}", path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A document skipped this cycle and the reason.
#[derive(Debug)]
pub struct DocumentFailure {
    pub name: String,
    pub error: PipelineError,
}

/// Outcome of one completed cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Names written this cycle, in processing order.
    pub written: Vec<String>,
    /// Documents whose modification time matched the change record.
    pub unchanged: usize,
    pub failed: Vec<DocumentFailure>,
}

impl CycleReport {
    /// True when nothing was written and nothing failed.
    pub fn is_idle(&self) -> bool {
        self.written.is_empty() && self.failed.is_empty()
    }

    fn fail(&mut self, name: String, error: PipelineError) {
        log!("error"; "{name}: {}", describe(&error));
        self.failed.push(DocumentFailure { name, error });
    }
}

/// A listed candidate: `<source>/<name><source_ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceEntry {
    name: String,
    path: PathBuf,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Owns the change record and everything needed to run a cycle.
#[derive(Debug)]
pub struct Pipeline<F: Formatter = PostFormatter> {
    build: BuildConfig,
    templates: Templates,
    formatter: F,
    tracker: ChangeTracker,
}

impl Pipeline<PostFormatter> {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            config.build.clone(),
            PostFormatter::new(config.meta.clone()),
        )
    }
}

impl<F: Formatter> Pipeline<F> {
    pub fn new(build: BuildConfig, formatter: F) -> Self {
        Self {
            templates: Templates::from_config(&build),
            build,
            formatter,
            tracker: ChangeTracker::new(),
        }
    }

    #[allow(unused)]
    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    /// Run one full cycle.
    ///
    /// Returns `Err` only when the source directory cannot be listed.
    pub fn run_cycle(&mut self, mode: ScanMode) -> Result<CycleReport, PipelineError> {
        let entries = self.list_sources()?;
        let mut report = CycleReport::default();

        for entry in entries {
            let modified = match modified_time(&entry.path) {
                Ok(Some(modified)) => modified,
                Ok(None) => continue,
                Err(error) => {
                    report.fail(entry.name, error);
                    continue;
                }
            };

            if !self.tracker.needs_update(&entry.name, modified, mode) {
                report.unchanged += 1;
                continue;
            }

            log!("update"; "{}", entry.name);
            match self.process(&entry, modified) {
                Ok(()) => {
                    self.tracker.commit(&entry.name, modified);
                    report.written.push(entry.name);
                }
                Err(error) => report.fail(entry.name, error),
            }
        }

        if !report.is_idle() {
            log!(
                "scan";
                "{} written, {} unchanged, {} failed",
                report.written.len(),
                report.unchanged,
                report.failed.len()
            );
        }

        Ok(report)
    }

    fn list_sources(&self) -> Result<Vec<SourceEntry>, PipelineError> {
        let dir = &self.build.source;
        let listing = |source| PipelineError::Listing {
            path: dir.clone(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(listing)? {
            let entry = entry.map_err(listing)?;
            let file_name = entry.file_name();

            let Some(file_name) = file_name.to_str() else {
                log!("warn"; "skipping non UTF-8 file name {:?}", entry.path());
                continue;
            };
            let Some(name) = file_name.strip_suffix(self.build.source_ext.as_str()) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            entries.push(SourceEntry {
                name: name.to_owned(),
                path: entry.path(),
            });
        }

        Ok(entries)
    }

    /// Read, parse, render and write one document.
    fn process(&self, entry: &SourceEntry, modified: SystemTime) -> Result<(), PipelineError> {
        let raw = fs::read(&entry.path).map_err(|source| PipelineError::Read {
            path: entry.path.clone(),
            source,
        })?;

        let document = self.formatter.parse(&raw, from_system_time(modified))?;
        let html = self.templates.render(&self.formatter, &document)?;
        let html = minify(&html, &self.build);

        let output = self.build.output_path(&entry.name);
        let write_failed = |source| PipelineError::Write {
            path: output.clone(),
            source,
        };
        fs::create_dir_all(&self.build.output).map_err(write_failed)?;
        fs::write(&output, &html).map_err(write_failed)?;

        Ok(())
    }
}

/// Modification time of a regular file, `None` for anything else.
fn modified_time(path: &Path) -> Result<Option<SystemTime>, PipelineError> {
    let read_failed = |source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    };

    let meta = fs::metadata(path).map_err(read_failed)?;
    if !meta.is_file() {
        return Ok(None);
    }
    meta.modified().map(Some).map_err(read_failed)
}

/// `error: cause: cause ...` on one line.
pub fn describe(error: &(dyn StdError + 'static)) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetaConfig;
    use std::{fs::File, time::Duration};
    use tempfile::TempDir;

    struct Site {
        dir: TempDir,
        pipeline: Pipeline,
    }

    impl Site {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path();
            fs::create_dir(root.join("posts")).unwrap();
            fs::create_dir(root.join("templates")).unwrap();
            fs::write(
                root.join("templates/default.html"),
                "<h1>{{ title }}</h1>{{ body }}",
            )
            .unwrap();

            let build = BuildConfig {
                source: root.join("posts"),
                output: root.join("static"),
                templates: root.join("templates"),
                ..BuildConfig::default()
            };
            let meta = MetaConfig {
                date_format: "%Y-%m-%d".into(),
                ..MetaConfig::default()
            };
            let pipeline = Pipeline::new(build, PostFormatter::new(meta));

            Self { dir, pipeline }
        }

        fn path(&self, relative: &str) -> PathBuf {
            self.dir.path().join(relative)
        }

        fn write_post(&self, name: &str, content: &str) -> PathBuf {
            let path = self.path(&format!("posts/{name}.md"));
            fs::write(&path, content).unwrap();
            path
        }

        fn output(&self, name: &str) -> Option<String> {
            fs::read_to_string(self.path(&format!("static/{name}.html"))).ok()
        }

        fn run(&mut self, mode: ScanMode) -> CycleReport {
            self.pipeline.run_cycle(mode).unwrap()
        }
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000 + secs)
    }

    #[test]
    fn test_renders_and_creates_output_dir() {
        let mut site = Site::new();
        site.write_post("hello", "Title: Hi\n---\nHello");

        let report = site.run(ScanMode::Incremental);

        assert_eq!(report.written, vec!["hello".to_string()]);
        assert!(report.failed.is_empty());
        assert_eq!(site.output("hello").unwrap(), "<h1>Hi</h1><p>Hello</p>");
        assert!(site.pipeline.tracker().recorded("hello").is_some());
    }

    #[test]
    fn test_second_cycle_is_idle() {
        let mut site = Site::new();
        site.write_post("a", "Title: A\n---\nx");
        site.write_post("b", "Title: B\n---\ny");

        let first = site.run(ScanMode::Incremental);
        assert_eq!(first.written.len(), 2);
        let recorded = site.pipeline.tracker().recorded("a");

        let second = site.run(ScanMode::Incremental);
        assert!(second.is_idle());
        assert_eq!(second.unchanged, 2);
        assert_eq!(site.pipeline.tracker().recorded("a"), recorded);
        assert_eq!(site.pipeline.tracker().len(), 2);
    }

    #[test]
    fn test_changed_mtime_reprocesses() {
        let mut site = Site::new();
        let path = site.write_post("post", "Title: One\n---\n");
        set_mtime(&path, at(100));
        site.run(ScanMode::Incremental);

        fs::write(&path, "Title: Two\n---\n").unwrap();
        set_mtime(&path, at(200));
        let report = site.run(ScanMode::Incremental);

        assert_eq!(report.written, vec!["post".to_string()]);
        assert_eq!(site.output("post").unwrap(), "<h1>Two</h1>");
        assert_eq!(site.pipeline.tracker().recorded("post"), Some(at(200)));
    }

    #[test]
    fn test_earlier_mtime_reprocesses() {
        let mut site = Site::new();
        let path = site.write_post("post", "Title: One\n---\n");
        set_mtime(&path, at(100));
        site.run(ScanMode::Incremental);

        set_mtime(&path, at(50));
        let report = site.run(ScanMode::Incremental);

        assert_eq!(report.written.len(), 1);
        assert_eq!(site.pipeline.tracker().recorded("post"), Some(at(50)));
    }

    #[test]
    fn test_force_reprocesses_everything() {
        let mut site = Site::new();
        site.write_post("a", "---\n");
        site.write_post("b", "---\n");
        site.run(ScanMode::Incremental);

        let report = site.run(ScanMode::Force);
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.unchanged, 0);
    }

    #[test]
    fn test_missing_separator_skips_and_continues() {
        let mut site = Site::new();
        site.write_post("bad", "Title: no separator");
        site.write_post("good", "Title: ok\n---\n");

        let report = site.run(ScanMode::Incremental);

        assert_eq!(report.written, vec!["good".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "bad");
        assert!(matches!(
            report.failed[0].error,
            PipelineError::Parse(ParseError::MissingBodyMarker { .. })
        ));
        assert!(site.output("bad").is_none());
        assert_eq!(site.pipeline.tracker().recorded("bad"), None);

        // still failing, still retried
        let again = site.run(ScanMode::Incremental);
        assert_eq!(again.failed.len(), 1);
        assert_eq!(again.unchanged, 1);
    }

    #[test]
    fn test_missing_template_retried_next_cycle() {
        let mut site = Site::new();
        site.write_post("post", "Template: custom\n---\nbody");

        let report = site.run(ScanMode::Incremental);
        assert!(matches!(
            report.failed[0].error,
            PipelineError::Render(RenderError::TemplateNotFound { .. })
        ));
        assert_eq!(site.pipeline.tracker().recorded("post"), None);

        fs::write(site.path("templates/custom.html"), "custom:{{ body }}").unwrap();
        let report = site.run(ScanMode::Incremental);

        assert_eq!(report.written, vec!["post".to_string()]);
        assert_eq!(site.output("post").unwrap(), "custom:<p>body</p>");
    }

    #[test]
    fn test_write_failure_skips_document() {
        let mut site = Site::new();
        site.write_post("blocked", "Title: blocked\n---\n");
        site.write_post("open", "Title: open\n---\n");
        fs::create_dir_all(site.path("static/blocked.html")).unwrap();

        let report = site.run(ScanMode::Incremental);

        assert_eq!(report.written, vec!["open".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "blocked");
        assert!(matches!(report.failed[0].error, PipelineError::Write { .. }));
        assert_eq!(site.pipeline.tracker().recorded("blocked"), None);
        assert!(site.pipeline.tracker().recorded("open").is_some());

        // retried once the output path is writable again
        fs::remove_dir(site.path("static/blocked.html")).unwrap();
        let report = site.run(ScanMode::Incremental);
        assert_eq!(report.written, vec!["blocked".to_string()]);
        assert_eq!(site.output("blocked").unwrap(), "<h1>blocked</h1>");
    }

    #[test]
    fn test_listing_failure_aborts_cycle() {
        let mut site = Site::new();
        fs::remove_dir(site.path("posts")).unwrap();

        let err = site.pipeline.run_cycle(ScanMode::Incremental).unwrap_err();
        assert!(matches!(err, PipelineError::Listing { .. }));
        assert!(describe(&err).contains("cannot list source directory"));
    }

    #[test]
    fn test_ignores_other_entries() {
        let mut site = Site::new();
        site.write_post("post", "---\n");
        fs::write(site.path("posts/notes.txt"), "---\n").unwrap();
        fs::write(site.path("posts/.md"), "---\n").unwrap();
        fs::create_dir(site.path("posts/nested.md")).unwrap();
        fs::create_dir(site.path("posts/sub")).unwrap();
        fs::write(site.path("posts/sub/deep.md"), "---\n").unwrap();

        let report = site.run(ScanMode::Incremental);

        assert_eq!(report.written, vec!["post".to_string()]);
        assert!(report.failed.is_empty());
        assert_eq!(report.unchanged, 0);
    }

    #[test]
    fn test_date_binding_uses_mtime_fallback() {
        let mut site = Site::new();
        fs::write(site.path("templates/default.html"), "{{ date }}").unwrap();
        let path = site.write_post("post", "Date: garbage\n---\n");
        set_mtime(&path, at(0));

        site.run(ScanMode::Incremental);

        let expected = from_system_time(at(0)).format("%Y-%m-%d").to_string();
        assert_eq!(site.output("post").unwrap(), expected);
    }

    #[test]
    fn test_minify_output() {
        let mut site = Site::new();
        site.pipeline.build.minify = true;
        fs::write(
            site.path("templates/default.html"),
            "<div>\n    {{ body }}\n</div>",
        )
        .unwrap();
        site.write_post("post", "---\nHello");

        site.run(ScanMode::Incremental);

        let out = site.output("post").unwrap();
        assert!(!out.contains('\n'));
        assert!(out.contains("Hello"));
    }
}
