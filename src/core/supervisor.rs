//! # Supervisor: installed fault-handling state.
//!
//! A [`Supervisor`] is an immutable snapshot of everything the panic hook needs:
//! configuration, the primary context, the report writer and the subscribers.
//! [`SupervisorBuilder::install`](crate::SupervisorBuilder::install) makes it
//! the process-wide active supervisor.
//!
//! ## High-level architecture
//! ```text
//! SupervisorBuilder ── install() ──► ACTIVE: Arc<Supervisor>  (last writer wins)
//!                                        ▲
//!   any thread panics ─► panic hook ─────┘ (one snapshot per fault)
//!                           ├─► record(): FaultIntercepted ─► ReportWriter::persist
//!                           └─► verdict (Recover | Propagate)
//!
//!   primary thread: run_primary(&dispatch) ─► RecoveryLoop
//!                           └─► catch_unwind(dispatch.run()) ─► resume / resume_unwind
//! ```
//!
//! ## Example
//! ```no_run
//! use faultvisor::{DispatchQueue, Supervisor, SupervisorConfig};
//!
//! let sup = Supervisor::builder(SupervisorConfig::default())
//!     .persist_faults(true)
//!     .recover_primary_context(true)
//!     .install();
//!
//! let queue = DispatchQueue::new();
//! let work = queue.handle();
//! std::thread::spawn(move || {
//!     work.submit(|| panic!("boom")).unwrap();
//!     work.submit(|| println!("still alive")).unwrap();
//!     work.quit().unwrap();
//! });
//!
//! sup.run_primary(&queue).unwrap();
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::dispatch::Dispatch;
use crate::error::SupervisorError;
use crate::events::{Event, EventKind};
use crate::fault::Fault;
use crate::report::{ReportWriter, Storage};
use crate::subscribers::SubscriberSet;

use super::builder::SupervisorBuilder;
use super::config::SupervisorConfig;
use super::context::ContextId;
use super::interceptor;
use super::recovery::RecoveryLoop;

/// Process-wide fault supervisor.
pub struct Supervisor {
    pub(super) cfg: SupervisorConfig,
    pub(super) primary: ContextId,
    pub(super) writer: ReportWriter,
    pub(super) storage: Arc<dyn Storage>,
    pub(super) subs: SubscriberSet,
}

impl Supervisor {
    /// Starts configuring a supervisor.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    /// The active supervisor, if one is installed.
    pub fn current() -> Option<Arc<Supervisor>> {
        interceptor::active()
    }

    /// Deactivates the current supervisor.
    ///
    /// The panic hook stays registered but only forwards to the hook that was
    /// active before the first `install()`. Returns the removed supervisor.
    pub fn uninstall() -> Option<Arc<Supervisor>> {
        let removed = interceptor::unregister();
        if let Some(sup) = &removed {
            sup.emit(Event::new(EventKind::Uninstalled));
        }
        removed
    }

    /// Installed configuration.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Primary execution context.
    pub fn primary(&self) -> ContextId {
        self.primary
    }

    /// Whether `context` is the primary execution context.
    #[inline]
    pub fn is_primary(&self, context: ContextId) -> bool {
        self.primary == context
    }

    /// Whether this supervisor is the one the panic hook currently serves.
    pub fn is_active(&self) -> bool {
        interceptor::active().is_some_and(|active| std::ptr::eq(Arc::as_ptr(&active), self))
    }

    /// Report writer used for persisted faults.
    pub fn writer(&self) -> &ReportWriter {
        &self.writer
    }

    /// Receiver for every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.subs.bus().subscribe()
    }

    /// Builder seeded with this supervisor's settings, subscribers, storage,
    /// primary context and bus. Installing it replaces this supervisor.
    pub fn reconfigure(&self) -> SupervisorBuilder {
        SupervisorBuilder::new(self.cfg.clone())
            .with_subscribers(self.subs.subscribers().to_vec())
            .with_storage(Arc::clone(&self.storage))
            .with_primary(self.primary)
            .with_bus(self.subs.bus().clone())
    }

    /// Runs `dispatch` on the primary context under the recovery loop.
    ///
    /// Returns once `dispatch` returns normally. A fault whose verdict is
    /// "propagate" (recovery disabled) continues unwinding out of this call.
    ///
    /// This blocks the calling thread. Call it from a plain thread (e.g. a
    /// synchronous `main`), not from a thread that drives a tokio runtime.
    ///
    /// # Errors
    /// - [`SupervisorError::NotPrimary`] when called from any other context.
    /// - [`SupervisorError::InsideRuntime`] when called inside a tokio runtime.
    pub fn run_primary<D: Dispatch + ?Sized>(&self, dispatch: &D) -> Result<(), SupervisorError> {
        let actual = ContextId::current();
        if !self.is_primary(actual) {
            return Err(SupervisorError::NotPrimary {
                expected: self.primary,
                actual,
            });
        }
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(SupervisorError::InsideRuntime { context: actual });
        }
        RecoveryLoop::new(self).run(dispatch);
        Ok(())
    }

    /// Logs `fault` and, if enabled, persists its report.
    ///
    /// Never fails: reporting errors end up as `ReportFailed` events.
    pub(crate) fn record(&self, fault: &Fault) {
        self.emit(Event::for_fault(EventKind::FaultIntercepted, fault).with_reason(fault.message()));
        if self.cfg.persist_faults {
            self.writer.persist(fault, &self.subs);
        }
    }

    pub(crate) fn emit(&self, event: Event) {
        self.subs.emit(event);
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("cfg", &self.cfg)
            .field("primary", &self.primary)
            .field("subscribers", &self.subs.len())
            .finish_non_exhaustive()
    }
}
