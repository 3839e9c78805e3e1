//! # Events emitted while supervising faults.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: supervisor installation and removal
//! - **Fault events**: interception, report persistence, propagation
//! - **Recovery events**: the primary dispatch loop's state transitions
//!
//! The [`Event`] struct carries metadata such as timestamps, the raising
//! context, reasons, artifact paths and resume delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. For one fault the order is always
//! `FaultIntercepted → Report* → RecoveryScheduled | FaultPropagated`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use faultvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::DispatchResuming)
//!     .with_attempt(3)
//!     .with_delay(Duration::from_millis(250));
//!
//! assert_eq!(ev.kind, EventKind::DispatchResuming);
//! assert_eq!(ev.delay_ms, Some(250));
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::ContextId;
use crate::fault::Fault;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of fault-handling events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Lifecycle events ===
    /// A supervisor became the active panic handler.
    ///
    /// Sets:
    /// - `context`: primary context
    Installed,

    /// The active supervisor was removed; panics go to the previous hook only.
    Uninstalled,

    // === Fault events ===
    /// A panic reached the fault interceptor.
    ///
    /// Sets:
    /// - `context`, `thread`: raising context
    /// - `reason`: panic message
    /// - `location`: `file:line:col`, if known
    FaultIntercepted,

    /// A diagnostic report was persisted.
    ///
    /// Sets:
    /// - `context`: raising context
    /// - `path`: artifact path
    ReportWritten,

    /// Storage was unavailable; no report was attempted.
    ///
    /// Sets:
    /// - `context`: raising context
    ReportSkipped,

    /// Persisting the report failed; the error was swallowed.
    ///
    /// Sets:
    /// - `context`: raising context
    /// - `reason`: error message
    ReportFailed,

    /// The fault is on the primary context and will be recovered.
    ///
    /// Sets:
    /// - `context`: primary context
    RecoveryScheduled,

    /// The fault continues to the runtime's default (fatal) handling.
    ///
    /// Sets:
    /// - `context`: raising context
    FaultPropagated,

    // === Recovery events ===
    /// The recovery loop entered the dispatch loop for the first time.
    ///
    /// Sets:
    /// - `context`: primary context
    DispatchStarted,

    /// The dispatch loop panicked.
    ///
    /// Sets:
    /// - `context`: primary context
    /// - `attempt`: number of faults seen by this loop (1-based)
    /// - `reason`: panic message
    DispatchFaulted,

    /// The dispatch loop is about to be re-entered.
    ///
    /// Sets:
    /// - `context`: primary context
    /// - `attempt`: fault number being recovered from
    /// - `delay_ms`: pause before re-entry (0 for immediate)
    DispatchResuming,

    /// The dispatch loop returned normally (explicit quit).
    ///
    /// Sets:
    /// - `context`: primary context
    /// - `attempt`: total faults recovered by this loop
    DispatchStopped,
}

/// Fault-handling event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Execution context the event concerns.
    pub context: Option<ContextId>,
    /// Thread name of that context, if it has one.
    pub thread: Option<Arc<str>>,
    /// Human-readable reason (panic message, error details).
    pub reason: Option<Arc<str>>,
    /// Panic location (`file:line:col`).
    pub location: Option<Arc<str>>,
    /// Artifact path of a written report.
    pub path: Option<Arc<Path>>,
    /// Fault counter of the recovery loop.
    pub attempt: Option<u32>,
    /// Resume delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            context: None,
            thread: None,
            reason: None,
            location: None,
            path: None,
            attempt: None,
            delay_ms: None,
        }
    }

    /// Creates an event describing `fault`: context, thread name, message and location.
    pub fn for_fault(kind: EventKind, fault: &Fault) -> Self {
        let mut ev = Self::new(kind).with_context(fault.context());
        ev.thread = fault.thread_name().map(Arc::from);
        ev.location = fault.location().map(Arc::from);
        ev
    }

    /// Attaches the execution context.
    #[inline]
    pub fn with_context(mut self, context: ContextId) -> Self {
        self.context = Some(context);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an artifact path.
    #[inline]
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(Arc::from(path.as_ref()));
        self
    }

    /// Attaches a fault counter.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a resume delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Whether this event reports the outcome of a persistence attempt.
    #[inline]
    pub fn is_report_outcome(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ReportWritten | EventKind::ReportSkipped | EventKind::ReportFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::Installed);
        let b = Event::new(EventKind::Installed);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn for_fault_copies_fault_identity() {
        let fault = Fault::new("boom").with_location("src/a.rs:1:1");
        let ev = Event::for_fault(EventKind::FaultIntercepted, &fault).with_reason(fault.message());

        assert_eq!(ev.context, Some(ContextId::current()));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
        assert_eq!(ev.location.as_deref(), Some("src/a.rs:1:1"));
        assert!(!ev.is_report_outcome());
    }

    #[test]
    fn delay_saturates_at_u32_millis() {
        let ev = Event::new(EventKind::DispatchResuming).with_delay(Duration::from_secs(u64::MAX / 4));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }
}
