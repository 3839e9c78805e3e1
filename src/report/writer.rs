//! # ReportWriter: one diagnostic report per fault.
//!
//! ## Flow
//! ```text
//! write(fault)
//!   ├─ storage.is_available()? ── no ──► Ok(Skipped)
//!   ├─ storage.resolve_dir()            (create if absent)
//!   ├─ name = prefix + raised_at("%Y-%m-%d-%H-%M-%S") + ".txt"
//!   └─ storage.write(dir/name, fault.render())
//!
//! persist(fault, subs)                  catch-and-log boundary
//!   └─ write(fault) ─► ReportWritten | ReportSkipped | ReportFailed
//! ```
//!
//! ## Rules
//! - [`ReportWriter::persist`] never returns an error and never panics; it is
//!   the only entry point used while handling a fault.
//! - Same-second collisions overwrite; the write is still attempted.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::error::ReportError;
use crate::events::{Event, EventKind};
use crate::fault::Fault;
use crate::subscribers::SubscriberSet;

use super::Storage;

/// Timestamp layout of artifact names (`yyyy-MM-dd-HH-mm-ss`).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Artifact extension.
const EXTENSION: &str = "txt";

/// Result of a persistence attempt that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The report was written to this path.
    Written(PathBuf),
    /// Storage was unavailable; nothing was attempted.
    Skipped,
}

/// Renders faults and persists them through a [`Storage`].
#[derive(Clone)]
pub struct ReportWriter {
    storage: Arc<dyn Storage>,
    prefix: Arc<str>,
}

impl ReportWriter {
    /// Creates a writer naming artifacts `<prefix><timestamp>.txt`.
    pub fn new(storage: Arc<dyn Storage>, prefix: impl Into<Arc<str>>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    /// Artifact name for a fault raised at `at`.
    pub fn artifact_name(&self, at: DateTime<Local>) -> String {
        format!("{}{}.{EXTENSION}", self.prefix, at.format(TIMESTAMP_FORMAT))
    }

    /// Writes the report for `fault`.
    ///
    /// Returns `Ok(Skipped)` when storage is unavailable.
    pub fn write(&self, fault: &Fault) -> Result<ReportOutcome, ReportError> {
        if !self.storage.is_available() {
            return Ok(ReportOutcome::Skipped);
        }
        let dir = self.storage.resolve_dir()?;
        let path = dir.join(self.artifact_name(fault.raised_at()));
        self.storage.write(&path, fault.render().as_bytes())?;
        Ok(ReportOutcome::Written(path))
    }

    /// Writes the report for `fault`, reporting the outcome as an event.
    ///
    /// Errors are logged through `subs` and swallowed. Returns the artifact
    /// path when one was written.
    pub fn persist(&self, fault: &Fault, subs: &SubscriberSet) -> Option<PathBuf> {
        match self.write(fault) {
            Ok(ReportOutcome::Written(path)) => {
                subs.emit(Event::for_fault(EventKind::ReportWritten, fault).with_path(&path));
                Some(path)
            }
            Ok(ReportOutcome::Skipped) => {
                subs.emit(
                    Event::for_fault(EventKind::ReportSkipped, fault)
                        .with_reason("storage unavailable"),
                );
                None
            }
            Err(err) => {
                subs.emit(Event::for_fault(EventKind::ReportFailed, fault).with_reason(err.to_string()));
                None
            }
        }
    }
}
