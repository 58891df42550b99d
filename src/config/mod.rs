//! Site configuration management for `quire.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[build]`   | Source/output/template directories + extensions  |
//! | `[meta]`    | Metadata prefixes, body separator, date format   |
//! | `[serve]`   | Static file server (interface, port)             |
//! | `[watch]`   | Scan loop (interval, filesystem notifications)   |
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "posts"
//! output = "static"
//! default_template = "post"
//!
//! [meta]
//! date_format = "%Y-%m-%d"
//!
//! [watch]
//! interval = 4
//! ```
//!
//! A config file that does not end in `.toml` is read with the line-oriented
//! format in [`legacy`].
//!
//! The config is loaded once at startup and never mutated afterwards.

mod build;
pub mod defaults;
mod error;
pub mod legacy;
mod meta;
mod serve;

pub use build::{BuildConfig, join_with_ext};
pub use error::ConfigError;
pub use meta::MetaConfig;
pub use serve::{ServeConfig, WatchConfig};

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use chrono::format::{Item, StrftimeItems};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing quire.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute site root (set after loading)
    #[serde(skip)]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directories and extensions
    #[serde(default)]
    pub build: BuildConfig,

    /// Metadata grammar
    #[serde(default)]
    pub meta: MetaConfig,

    /// Static file server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Scan loop settings
    #[serde(default)]
    pub watch: WatchConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path.
    ///
    /// `.toml` files are parsed as TOML, anything else as `label: value` lines.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        if is_toml(path) {
            Self::from_str(&content)
        } else {
            Ok(legacy::parse(&content)?)
        }
    }

    /// Load the config named by the CLI, apply CLI overrides and validate.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = Self::site_root(cli).join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else if cli.is_init() {
            Self::default()
        } else {
            bail!(ConfigError::Io(
                config_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
            ));
        };

        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = Self::site_root(cli);

        Self::update_option(&mut self.build.source, cli.source.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());
        Self::update_option(&mut self.build.templates, cli.templates.as_ref());

        match &cli.command {
            Commands::Watch { interval, .. } => {
                Self::update_option(&mut self.watch.interval, interval.as_ref());
            }
            Commands::Serve {
                interface,
                port,
                interval,
                ..
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.watch.interval, interval.as_ref());
            }
            _ => {}
        }

        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.update_path_with_root(&root);
    }

    /// Site root named by the CLI; `init <NAME>` targets `<root>/<NAME>`.
    fn site_root(cli: &Cli) -> PathBuf {
        let base = cli.root.clone().unwrap_or_else(|| PathBuf::from("./"));
        match &cli.command {
            Commands::Init { name: Some(name) } => base.join(name),
            _ => base,
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve all directories against the root (with tilde expansion) and
    /// normalize them to absolute paths.
    pub fn update_path_with_root(&mut self, root: &Path) {
        let root = Self::normalize_path(root);

        self.build.source = Self::resolve(&root, &self.build.source);
        self.build.output = Self::resolve(&root, &self.build.output);
        self.build.templates = Self::resolve(&root, &self.build.templates);
        self.root = root;
    }

    fn resolve(root: &Path, path: &Path) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        if expanded.is_relative() {
            Self::normalize_path(&root.join(expanded))
        } else {
            Self::normalize_path(&expanded)
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate extension, prefix and interval settings.
    pub fn validate(&self) -> Result<()> {
        let extensions = [
            ("[build.source_ext]", &self.build.source_ext),
            ("[build.output_ext]", &self.build.output_ext),
            ("[build.template_ext]", &self.build.template_ext),
        ];
        for (field, ext) in extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                bail!(ConfigError::Validation(format!(
                    "{field} must start with `.` and name an extension, got `{ext}`"
                )));
            }
        }

        if self.build.default_template.trim().is_empty() {
            bail!(ConfigError::Validation("[build.default_template] is empty".into()));
        }

        for (key, prefix) in self.meta.prefixes() {
            if prefix.is_empty() {
                bail!(ConfigError::Validation(format!("[meta.{key}] is empty")));
            }
        }

        if self.meta.separator.trim().is_empty() {
            bail!(ConfigError::Validation("[meta.separator] is empty".into()));
        }

        if self.meta.date_format.is_empty() {
            bail!(ConfigError::Validation("[meta.date_format] is empty".into()));
        }
        if StrftimeItems::new(&self.meta.date_format).any(|item| item == Item::Error) {
            bail!(ConfigError::Validation(format!(
                "[meta.date_format] `{}` is not a valid strftime format",
                self.meta.date_format
            )));
        }
        let has_conversion = StrftimeItems::new(&self.meta.date_format)
            .any(|item| matches!(item, Item::Numeric(..) | Item::Fixed(_)));
        if !has_conversion {
            bail!(ConfigError::Validation(format!(
                "[meta.date_format] `{}` has no date or time conversion",
                self.meta.date_format
            )));
        }

        if self.watch.interval == 0 {
            bail!(ConfigError::Validation(
                "[watch.interval] must be at least 1 second".into()
            ));
        }

        Ok(())
    }
}

/// Whether `path` names a TOML config rather than a line-oriented one.
pub fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

// ============================================================================
// Tests
// ============================================================================
