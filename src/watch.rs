//! Periodic scan scheduling.
//!
//! Runs a scan cycle every `[watch] interval` seconds. With `[watch] notify`
//! on, filesystem events in the source and template directories wake the
//! loop early so edits show up without waiting for the next tick.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       Scheduler                           │
//! │                                                           │
//! │  ┌──────────┐    ┌───────────┐                            │
//! │  │ notify   │───▶│ Debouncer │──┐                         │
//! │  │ events   │    │ (300ms)   │  │   ┌──────────────────┐  │
//! │  └──────────┘    └───────────┘  ├──▶│ tick()           │  │
//! │  ┌──────────┐                   │   │ try_lock → cycle │  │
//! │  │ interval │───────────────────┘   └──────────────────┘  │
//! │  └──────────┘                                             │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Cycles never overlap: a tick that finds the pipeline locked is skipped.
//! Templates are not covered by the change record, so a template edit turns
//! the next cycle into a forced rebuild.

use crate::{
    config::SiteConfig,
    log,
    pipeline::{CycleReport, Pipeline, describe},
    tracker::ScanMode,
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        mpsc::{self, Receiver, RecvTimeoutError},
    },
    thread,
    time::{Duration, Instant},
};

/// Pipeline shared between the scheduler and whoever else may run a cycle.
pub type SharedPipeline = Arc<Mutex<Pipeline>>;

const DEBOUNCE_MS: u64 = 300;

// =============================================================================
// Single-flight guard
// =============================================================================

/// Result of asking for a cycle.
#[derive(Debug)]
pub enum Tick {
    /// Another cycle held the pipeline.
    Skipped,
    /// The source directory could not be listed.
    Aborted,
    Completed(CycleReport),
}

/// Run a cycle unless one is already in flight.
pub fn run_guarded(pipeline: &Mutex<Pipeline>, mode: ScanMode) -> Tick {
    let Some(mut pipeline) = pipeline.try_lock() else {
        log!("watch"; "previous cycle still running, skipping tick");
        return Tick::Skipped;
    };

    match pipeline.run_cycle(mode) {
        Ok(report) => Tick::Completed(report),
        Err(err) => {
            log!("error"; "{}", describe(&err));
            Tick::Aborted
        }
    }
}

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

// =============================================================================
// Debounce State
// =============================================================================

/// What the batched events touched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Changes {
    sources: bool,
    templates: bool,
}

/// Batches rapid file events until they settle.
struct Debouncer {
    templates: PathBuf,
    delay: Duration,
    pending: Changes,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new(templates: PathBuf) -> Self {
        Self {
            templates,
            delay: Duration::from_millis(DEBOUNCE_MS),
            pending: Changes::default(),
            last_event: None,
        }
    }

    fn add(&mut self, event: Event) {
        let mut touched = false;
        for path in event.paths.iter().filter(|p| !is_temp_file(p)) {
            if path.starts_with(&self.templates) {
                self.pending.templates = true;
            } else {
                self.pending.sources = true;
            }
            touched = true;
        }
        if touched {
            self.last_event = Some(Instant::now());
        }
    }

    fn is_pending(&self) -> bool {
        self.pending != Changes::default()
    }

    fn ready(&self) -> bool {
        self.is_pending() && self.last_event.is_some_and(|t| t.elapsed() >= self.delay)
    }

    fn take(&mut self) -> Changes {
        self.last_event = None;
        std::mem::take(&mut self.pending)
    }

    /// How long to wait for more events before the batch is ready.
    fn timeout(&self) -> Option<Duration> {
        let last = self.last_event.filter(|_| self.is_pending())?;
        Some(self.delay.saturating_sub(last.elapsed()))
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Drives scan cycles on a fixed interval, optionally woken by file events.
pub struct Scheduler {
    pipeline: SharedPipeline,
    interval: Duration,
    notify: bool,
    source: PathBuf,
    templates: PathBuf,
}

impl Scheduler {
    pub fn new(pipeline: SharedPipeline, config: &SiteConfig) -> Self {
        Self {
            pipeline,
            interval: config.watch.interval(),
            notify: config.watch.notify,
            source: config.build.source.clone(),
            templates: config.build.templates.clone(),
        }
    }

    pub fn tick(&self, mode: ScanMode) -> Tick {
        run_guarded(&self.pipeline, mode)
    }

    /// Loop forever. `first` is the mode of the first cycle.
    pub fn run(&self, first: ScanMode) -> Result<()> {
        let (mut events, _watcher) = if self.notify {
            let (rx, watcher) = self.start_watcher()?;
            (Some(rx), Some(watcher))
        } else {
            (None, None)
        };

        log!("watch"; "scanning {} every {}s", self.source.display(), self.interval.as_secs());

        let mut debouncer = Debouncer::new(self.templates.clone());
        let mut mode = first;
        let mut next_tick = Instant::now();

        loop {
            let now = Instant::now();
            if now >= next_tick || debouncer.ready() {
                if debouncer.take().templates {
                    log!("watch"; "template changed, rebuilding all documents");
                    mode = ScanMode::Force;
                }
                // a skipped tick keeps a pending force for the next one
                match self.tick(mode) {
                    Tick::Skipped => {}
                    Tick::Completed(report) if mode == ScanMode::Force => {
                        log!("watch"; "rebuilt {} documents", report.written.len());
                        mode = ScanMode::Incremental;
                    }
                    Tick::Completed(_) | Tick::Aborted => mode = ScanMode::Incremental,
                }
                next_tick = Instant::now() + self.interval;
                continue;
            }

            let until_tick = next_tick - now;
            let timeout = debouncer
                .timeout()
                .map_or(until_tick, |t| t.min(until_tick));

            let Some(rx) = &events else {
                thread::sleep(timeout);
                continue;
            };

            match rx.recv_timeout(timeout) {
                Ok(Ok(event)) if is_relevant(&event) => debouncer.add(event),
                Ok(Ok(_)) | Err(RecvTimeoutError::Timeout) => {}
                Ok(Err(e)) => log!("watch"; "error: {e}"),
                Err(RecvTimeoutError::Disconnected) => {
                    log!("warn"; "file watcher stopped, falling back to interval scans");
                    events = None;
                }
            }
        }
    }

    fn start_watcher(&self) -> Result<(Receiver<notify::Result<Event>>, RecommendedWatcher)> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;

        for (label, dir) in [("source", &self.source), ("templates", &self.templates)] {
            if !dir.exists() {
                log!("warn"; "{label} directory {} does not exist, not watching it", dir.display());
                continue;
            }
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch {label}: {}", dir.display()))?;
            log!("watch"; "{label}: {}", dir.display());
        }

        Ok((rx, watcher))
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Start the blocking scan loop over a shared pipeline.
pub fn watch_blocking(pipeline: SharedPipeline, config: &SiteConfig, first: ScanMode) -> Result<()> {
    Scheduler::new(pipeline, config).run(first)
}
