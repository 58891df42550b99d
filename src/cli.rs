//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quire incremental blog builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Root directory of the site (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name, relative to root. Files not ending in `.toml`
    /// are read as `label: value` lines.
    #[arg(short = 'C', long, default_value = "quire.toml")]
    pub config: PathBuf,

    /// Source directory path (relative to root)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Output directory path (relative to root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Template directory path (relative to root)
    #[arg(short, long)]
    pub templates: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a site skeleton with a config file, a default template and a sample post
    Init {
        /// the name(path) of site directory, related to `root`
        name: Option<PathBuf>,
    },

    /// Run a single scan cycle and exit
    Build {
        /// Render every document regardless of recorded modification times
        #[arg(short, long)]
        force: bool,
    },

    /// Run scan cycles on a fixed interval until interrupted
    Watch {
        /// Seconds between scan cycles
        #[arg(short, long)]
        interval: Option<u64>,

        /// Make the first cycle a forced rebuild
        #[arg(short, long)]
        force: bool,
    },

    /// Serve the output directory, rebuilding changed documents in the background
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,

        /// Seconds between scan cycles
        #[arg(long)]
        interval: Option<u64>,

        /// Serve only, without running scan cycles
        #[arg(long)]
        no_watch: bool,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch { .. })
    }
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}
