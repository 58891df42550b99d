//! Change tracking between scan cycles.
//!
//! The tracker remembers, per document name, the modification time that was
//! last rendered successfully. A document needs processing whenever its
//! current modification time differs from the recorded one, including when
//! the file went *back* in time (restored from a backup, `touch -d`, ...).
//!
//! Names are recorded only after their output was written, so a document that
//! failed to parse or render is retried on the next cycle.

use rustc_hash::FxHashMap;
use std::time::SystemTime;

/// Whether a cycle honours the change record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Only documents whose modification time changed.
    #[default]
    Incremental,
    /// Every document, regardless of the record.
    Force,
}

impl ScanMode {
    pub const fn from_force(force: bool) -> Self {
        if force { Self::Force } else { Self::Incremental }
    }
}

/// Last successfully processed modification time per document name.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    record: FxHashMap<String, SystemTime>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True unless `name` was last processed at exactly `modified`.
    pub fn should_process(&self, name: &str, modified: SystemTime) -> bool {
        self.record.get(name) != Some(&modified)
    }

    /// [`should_process`](Self::should_process), short-circuited by force mode.
    pub fn needs_update(&self, name: &str, modified: SystemTime, mode: ScanMode) -> bool {
        mode == ScanMode::Force || self.should_process(name, modified)
    }

    /// Record `name` as processed at `modified`.
    pub fn commit(&mut self, name: &str, modified: SystemTime) {
        match self.record.get_mut(name) {
            Some(slot) => *slot = modified,
            None => {
                self.record.insert(name.to_owned(), modified);
            }
        }
    }
}

/// Inspection helpers.
#[allow(unused)]
impl ChangeTracker {
    pub fn recorded(&self, name: &str) -> Option<SystemTime> {
        self.record.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }
}
