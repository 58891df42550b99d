//! Site initialization module.
//!
//! Creates a new site skeleton: config file, source/output/template
//! directories, a default template and one sample post.

use crate::{
    config::{SiteConfig, is_toml, join_with_ext, legacy},
    log,
};
use anyhow::{Context, Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Written to `<templates>/<default_template><template_ext>`.
const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ title }}</title>
</head>
<body>
  <article>
    <h1>{{ title }}</h1>
    <p class="byline">{{ author }}{% if tag %} · {{ tag }}{% endif %} · {{ date }}</p>
    {{ body }}
  </article>
</body>
</html>
"#;

/// Sample document, `hello<source_ext>`.
fn sample_post(config: &SiteConfig) -> String {
    let meta = &config.meta;
    format!(
        "{} Hello, world\n{} Anonymous\n{} meta\n{}\n\nThis post was created by `quire init`.\n\
         Edit it, or add more files next to it, and run `quire build`.\n",
        meta.title, meta.author, meta.tag, meta.separator
    )
}

/// Create a new site at `config.root`.
pub fn new_site(config: &SiteConfig) -> Result<()> {
    let root = &config.root;

    if config.config_path.exists() {
        bail!(
            "Config file `{}` already exists. Remove it manually or init in a different path.",
            config.config_path.display()
        );
    }
    if !is_dir_empty(root)? {
        bail!(
            "Directory `{}` is not empty. Use `quire init <SITE_NAME>` to create in a subdirectory.",
            root.display()
        );
    }

    init_site_structure(config)?;
    init_default_config(config)?;
    init_samples(config)?;

    log!("init"; "created site at {}", root.display());
    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Write the effective configuration, in the format its file name selects.
fn init_default_config(config: &SiteConfig) -> Result<()> {
    let path = &config.config_path;
    let saved = relative_to_root(config);
    let content = if is_toml(path) {
        toml::to_string_pretty(&saved)?
    } else {
        legacy::to_string(&saved)
    };
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Copy of `config` with directories under the root stored relative to it.
fn relative_to_root(config: &SiteConfig) -> SiteConfig {
    let relative = |path: &PathBuf| {
        path.strip_prefix(&config.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone())
    };

    let mut saved = config.clone();
    saved.build.source = relative(&config.build.source);
    saved.build.output = relative(&config.build.output);
    saved.build.templates = relative(&config.build.templates);
    saved
}

/// Create site directory structure
fn init_site_structure(config: &SiteConfig) -> Result<()> {
    let build = &config.build;
    for path in [&build.source, &build.output, &build.templates] {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}

fn init_samples(config: &SiteConfig) -> Result<()> {
    let build = &config.build;
    let files = [
        (
            join_with_ext(&build.templates, &build.default_template, &build.template_ext),
            DEFAULT_TEMPLATE.to_owned(),
        ),
        (build.source_path("hello"), sample_post(config)),
    ];

    for (path, content) in files {
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pipeline::Pipeline, tracker::ScanMode};

    fn config_at(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.config_path = root.join("quire.toml");
        config.update_path_with_root(root);
        config
    }

    #[test]
    fn test_new_site_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("blog");
        let config = config_at(&root);

        new_site(&config).unwrap();

        assert!(root.join("quire.toml").is_file());
        assert!(root.join("posts/hello.md").is_file());
        assert!(root.join("templates/default.html").is_file());
        assert!(root.join("static").is_dir());

        // the written config loads back
        SiteConfig::from_path(&root.join("quire.toml")).unwrap();
    }

    #[test]
    fn test_new_site_builds() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        new_site(&config).unwrap();

        let report = Pipeline::from_config(&config).run_cycle(ScanMode::Incremental).unwrap();

        assert_eq!(report.written, vec!["hello".to_string()]);
        let html = fs::read_to_string(config.build.output_path("hello")).unwrap();
        assert!(html.contains("<h1>Hello, world</h1>"));
        assert!(html.contains("Anonymous"));
    }

    #[test]
    fn test_saved_config_keeps_directory_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.config_path = dir.path().join("quire.toml");
        config.build.source = PathBuf::from("drafts");
        config.build.output = PathBuf::from("public");
        config.update_path_with_root(dir.path());

        new_site(&config).unwrap();

        let text = fs::read_to_string(&config.config_path).unwrap();
        let saved = SiteConfig::from_str(&text).unwrap();
        assert_eq!(saved.build.source, PathBuf::from("drafts"));
        assert_eq!(saved.build.output, PathBuf::from("public"));
        assert_eq!(saved.build.templates, PathBuf::from("templates"));
        assert!(config.root.join("drafts/hello.md").is_file());
    }

    #[test]
    fn test_line_config_name_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.config_path = dir.path().join("blog.config");
        config.update_path_with_root(dir.path());

        new_site(&config).unwrap();

        let text = fs::read_to_string(&config.config_path).unwrap();
        assert!(text.contains("inputDir: posts\n"));

        let mut reloaded = SiteConfig::from_path(&config.config_path).unwrap();
        reloaded.update_path_with_root(dir.path());
        assert!(reloaded.validate().is_ok());
        assert_eq!(reloaded.build.source, config.build.source);

        let report = Pipeline::from_config(&reloaded).run_cycle(ScanMode::Incremental).unwrap();
        assert_eq!(report.written, vec!["hello".to_string()]);
    }

    #[test]
    fn test_refuses_non_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stray.txt"), "x").unwrap();

        let err = new_site(&config_at(dir.path())).unwrap_err();
        assert!(err.to_string().contains("not empty"));
    }

    #[test]
    fn test_refuses_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("quire.toml"), "").unwrap();

        let err = new_site(&config_at(dir.path())).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
