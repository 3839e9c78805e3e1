//! Error types used by the faultvisor runtime.
//!
//! This module defines three error enums:
//!
//! - [`ReportError`]: a diagnostic report could not be persisted.
//! - [`SupervisorError`]: misuse of the supervisor API (e.g. running the
//!   recovery loop off the primary context or inside an async runtime).
//! - [`DispatchError`]: work could not be handed to a dispatch loop.
//!
//! All types provide `as_label` for logs and `as_message` for humans.
//! None of these ever escape the panic hook: reporting errors are caught and
//! logged at the [`ReportWriter`](crate::ReportWriter) boundary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::ContextId;

/// # Errors produced while persisting a diagnostic report.
///
/// These are "reporting faults": raised while handling another fault, so they
/// are logged and swallowed, never re-raised.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ReportError {
    /// The storage collaborator could not name a directory for reports.
    #[error("no diagnostic directory could be resolved")]
    NoDirectory,

    /// The diagnostic directory could not be created.
    #[error("failed to create diagnostic directory {path:?}: {source}")]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The report bytes could not be written.
    #[error("failed to write diagnostic report {path:?}: {source}")]
    Write {
        /// Artifact path that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl ReportError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use faultvisor::ReportError;
    ///
    /// assert_eq!(ReportError::NoDirectory.as_label(), "report_no_directory");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ReportError::NoDirectory => "report_no_directory",
            ReportError::CreateDir { .. } => "report_create_dir",
            ReportError::Write { .. } => "report_write",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ReportError::NoDirectory => "no diagnostic directory".to_string(),
            ReportError::CreateDir { path, source } => {
                format!("mkdir {}: {source}", path.display())
            }
            ReportError::Write { path, source } => {
                format!("write {}: {source}", path.display())
            }
        }
    }
}

/// # Errors produced by the supervisor API.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SupervisorError {
    /// The recovery loop was started on a context other than the primary one.
    #[error("recovery loop must run on the primary context {expected:?}, not {actual:?}")]
    NotPrimary {
        /// The configured primary context.
        expected: ContextId,
        /// The context that attempted to run the loop.
        actual: ContextId,
    },

    /// The recovery loop was started on a thread driving a tokio runtime.
    #[error("recovery loop cannot block inside a tokio runtime (context {context:?})")]
    InsideRuntime {
        /// The context that attempted to run the loop.
        context: ContextId,
    },
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::NotPrimary { .. } => "supervisor_not_primary",
            SupervisorError::InsideRuntime { .. } => "supervisor_inside_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SupervisorError::NotPrimary { expected, actual } => {
                format!("not primary: expected={expected} actual={actual}")
            }
            SupervisorError::InsideRuntime { context } => {
                format!("inside tokio runtime: context={context}")
            }
        }
    }
}

/// # Errors produced when submitting work to a dispatch loop.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// The dispatch loop was dropped; the job was not queued.
    #[error("dispatch loop closed")]
    Closed,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Closed => "dispatch_closed",
        }
    }
}
