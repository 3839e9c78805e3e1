//! # Fault interceptor: the process-wide panic hook.
//!
//! One hook is registered for the lifetime of the process (on the first
//! `install()`); it chains to whatever hook was active before it. Which
//! supervisor it serves is decided per fault by reading the active snapshot, so
//! re-installing is last-writer-wins without stacking hooks.
//!
//! ## Per-fault protocol (on the panicking thread, before unwinding)
//! ```text
//! on_panic(info)
//!   ├─ no active supervisor ─► clear verdict, previous hook
//!   ├─ fault = Fault::capture(info)
//!   ├─ record: FaultIntercepted ─► ReportWriter::persist (if persist_faults)
//!   └─ recover_primary_context && recovery loop running here?
//!         ├─ yes ─► verdict Recover, RecoveryScheduled   (default hook suppressed)
//!         └─ no  ─► verdict Propagate, FaultPropagated ─► previous hook
//! ```
//!
//! The verdict is left in a thread-local for the [`RecoveryLoop`](super::recovery)
//! that catches the unwind on the primary context.
//!
//! A recovery loop only ever runs on the primary context (`run_primary` checks
//! it), so "loop running on the faulting thread" identifies the primary even
//! when the active snapshot was installed from another thread.
//!
//! ## Rules
//! - The hook never panics: a panic inside a panic hook aborts the process.
//!   Every fallible step returns `Result` and is logged where it happens.
//! - Lock poisoning is ignored (`PoisonError::into_inner`).

use std::cell::Cell;
use std::panic::{self, PanicHookInfo};
use std::sync::{Arc, Once, PoisonError, RwLock};

use crate::events::{Event, EventKind};
use crate::fault::Fault;

use super::supervisor::Supervisor;

/// Hook that was active before ours.
type PreviousHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Supervisor served by the panic hook.
static ACTIVE: RwLock<Option<Arc<Supervisor>>> = RwLock::new(None);

/// Guards one-time hook registration.
static HOOK: Once = Once::new();

thread_local! {
    /// Set while a recovery loop is running on this thread.
    static LOOP_ACTIVE: Cell<bool> = const { Cell::new(false) };
    /// Decision taken by the hook for the most recent panic on this thread.
    static VERDICT: Cell<Option<Verdict>> = const { Cell::new(None) };
}

/// What happens to a fault after it has been recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// The recovery loop catches the unwind and re-enters dispatch.
    Recover,
    /// The unwind continues to the runtime's default handling.
    Propagate,
}

/// Makes `sup` the active supervisor, registering the hook on first use.
/// Returns the supervisor it replaced.
pub(crate) fn register(sup: Arc<Supervisor>) -> Option<Arc<Supervisor>> {
    let replaced = swap_active(Some(sup));
    HOOK.call_once(|| {
        let previous: PreviousHook = panic::take_hook();
        panic::set_hook(Box::new(move |info| on_panic(info, &previous)));
    });
    replaced
}

/// Clears the active supervisor. The hook stays registered and only chains.
pub(crate) fn unregister() -> Option<Arc<Supervisor>> {
    swap_active(None)
}

/// Currently active supervisor.
pub(crate) fn active() -> Option<Arc<Supervisor>> {
    ACTIVE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn swap_active(next: Option<Arc<Supervisor>>) -> Option<Arc<Supervisor>> {
    let mut slot = ACTIVE.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, next)
}

fn on_panic(info: &PanicHookInfo<'_>, previous: &PreviousHook) {
    let Some(sup) = active() else {
        clear_verdict();
        previous(info);
        return;
    };
    let fault = Fault::capture(info, sup.config().capture_backtrace);
    if intercept(&sup, &fault) == Verdict::Propagate {
        previous(info);
    }
}

/// Records `fault` and decides whether it is recovered.
pub(crate) fn intercept(sup: &Supervisor, fault: &Fault) -> Verdict {
    sup.record(fault);

    let verdict = if sup.config().recover_primary_context && loop_active() {
        Verdict::Recover
    } else {
        Verdict::Propagate
    };

    let kind = match verdict {
        Verdict::Recover => EventKind::RecoveryScheduled,
        Verdict::Propagate => EventKind::FaultPropagated,
    };
    sup.emit(Event::for_fault(kind, fault));
    let _ = VERDICT.try_with(|v| v.set(Some(verdict)));
    verdict
}

/// Takes the verdict left by the hook on this thread, if any.
pub(crate) fn take_verdict() -> Option<Verdict> {
    VERDICT.try_with(Cell::take).ok().flatten()
}

/// Drops a verdict left by a panic that never reached the recovery loop
/// (caught by user code inside a job).
pub(crate) fn clear_verdict() {
    let _ = VERDICT.try_with(Cell::take);
}

fn loop_active() -> bool {
    LOOP_ACTIVE.try_with(Cell::get).unwrap_or(false)
}

/// Marks the current thread as running a recovery loop until dropped.
pub(crate) struct LoopGuard {
    was_active: bool,
}

impl LoopGuard {
    pub(crate) fn enter() -> Self {
        let was_active = LOOP_ACTIVE.with(|flag| flag.replace(true));
        clear_verdict();
        Self { was_active }
    }
}

impl Drop for LoopGuard {
    fn drop(&mut self) {
        let _ = LOOP_ACTIVE.try_with(|flag| flag.set(self.was_active));
    }
}
