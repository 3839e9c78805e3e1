//! # LogWriter: operator log for fault handling
//!
//! A subscriber that turns every [`Event`] into a `tracing` record under the
//! `faultvisor` target. Every [`SubscriberSet`](crate::SubscriberSet) runs one
//! ahead of the configured subscribers, so every intercepted fault is visible
//! locally even when persistence is disabled or the subscriber list is empty.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! ERROR faultvisor: fault intercepted context=ThreadId(2) thread="primary" msg="boom" at=src/jobs.rs:42:9
//!  INFO faultvisor: report written context=ThreadId(2) path=/home/u/.cache/faultvisor/crashErrorInfo2026-10-19-10-22-01.txt
//!  WARN faultvisor: recovery scheduled context=ThreadId(2)
//!  INFO faultvisor: dispatch resuming context=ThreadId(2) attempt=1 delay_ms=0
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber backed by `tracing`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        let context = e.context.map(|c| c.to_string()).unwrap_or_default();
        let thread = e.thread.as_deref().unwrap_or("<unnamed>");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::Installed => {
                tracing::info!(target: "faultvisor", primary = %context, "supervisor installed");
            }
            EventKind::Uninstalled => {
                tracing::info!(target: "faultvisor", "supervisor uninstalled");
            }
            EventKind::FaultIntercepted => {
                tracing::error!(
                    target: "faultvisor",
                    context = %context,
                    thread,
                    msg = reason,
                    at = e.location.as_deref().unwrap_or("unknown"),
                    "fault intercepted"
                );
            }
            EventKind::ReportWritten => {
                tracing::info!(
                    target: "faultvisor",
                    context = %context,
                    path = ?e.path,
                    "report written"
                );
            }
            EventKind::ReportSkipped => {
                tracing::warn!(target: "faultvisor", context = %context, "report skipped: storage unavailable");
            }
            EventKind::ReportFailed => {
                tracing::warn!(target: "faultvisor", context = %context, err = reason, "report failed");
            }
            EventKind::RecoveryScheduled => {
                tracing::warn!(target: "faultvisor", context = %context, "recovery scheduled");
            }
            EventKind::FaultPropagated => {
                tracing::error!(target: "faultvisor", context = %context, thread, "fault propagated");
            }
            EventKind::DispatchStarted => {
                tracing::info!(target: "faultvisor", context = %context, "dispatch started");
            }
            EventKind::DispatchFaulted => {
                tracing::warn!(
                    target: "faultvisor",
                    context = %context,
                    attempt = e.attempt.unwrap_or(0),
                    msg = reason,
                    "dispatch faulted"
                );
            }
            EventKind::DispatchResuming => {
                tracing::info!(
                    target: "faultvisor",
                    context = %context,
                    attempt = e.attempt.unwrap_or(0),
                    delay_ms = e.delay_ms.unwrap_or(0),
                    "dispatch resuming"
                );
            }
            EventKind::DispatchStopped => {
                tracing::info!(
                    target: "faultvisor",
                    context = %context,
                    faults = e.attempt.unwrap_or(0),
                    "dispatch stopped"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
