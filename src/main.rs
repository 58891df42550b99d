//! Quire - an incremental static blog builder.

mod cli;
mod config;
mod document;
mod init;
mod logger;
mod pipeline;
mod render;
mod serve;
mod tracker;
mod utils;
mod watch;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use init::new_site;
use parking_lot::Mutex;
use pipeline::{Pipeline, describe};
use serve::serve_site;
use std::sync::Arc;
use tracker::ScanMode;
use watch::watch_blocking;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(SiteConfig::load(cli)?));

    match &cli.command {
        Commands::Init { .. } => new_site(config),
        Commands::Build { force } => build_once(config, ScanMode::from_force(*force)),
        Commands::Watch { force, .. } => {
            let pipeline = Arc::new(Mutex::new(Pipeline::from_config(config)));
            watch_blocking(pipeline, config, ScanMode::from_force(*force))
        }
        Commands::Serve { no_watch, .. } => {
            let pipeline = Arc::new(Mutex::new(Pipeline::from_config(config)));
            if *no_watch {
                pipeline.lock().run_cycle(ScanMode::Incremental)?;
            }
            serve_site(config, pipeline, !*no_watch, ScanMode::Incremental)
        }
    }
}

/// Run a single cycle; fail if it aborts or any document fails.
fn build_once(config: &SiteConfig, mode: ScanMode) -> Result<()> {
    let report = Pipeline::from_config(config).run_cycle(mode)?;

    if report.is_idle() {
        log!("scan"; "nothing to do, {} documents unchanged", report.unchanged);
    }
    if !report.failed.is_empty() {
        let failures: Vec<_> = report
            .failed
            .iter()
            .map(|f| format!("{}: {}", f.name, describe(&f.error)))
            .collect();
        bail!("{} document(s) failed\n{}", failures.len(), failures.join("\n"));
    }

    Ok(())
}
