//! # RecoveryLoop: keeps the primary dispatch loop alive across faults.
//!
//! ## State machine
//! ```text
//!              ┌────────────────────────────────────────────┐
//!              ▼                                            │
//!        ┌─────────────┐  panic   ┌─────────┐  recover  ┌──────────┐
//! start ─► Dispatching ├─────────►│ Faulted ├──────────►│ Resuming │
//!        └──────┬──────┘          └────┬────┘           └──────────┘
//!               │ run() returned       │ verdict Propagate       (pause per ResumePolicy)
//!               ▼                      ▼
//!        DispatchStopped          resume_unwind (fatal path)
//! ```
//!
//! - `Dispatching`: `Dispatch::run` under `catch_unwind`.
//! - `Faulted`: the panic hook has already recorded the fault and left a
//!   verdict. If our hook never saw it (another hook replaced ours), the loop
//!   runs the record protocol itself from the caught payload.
//! - `Resuming`: pause per [`ResumePolicy`](crate::ResumePolicy) (zero by
//!   default), then back to `Dispatching`.
//!
//! Fault handling has no exit: restarting with no fault budget is the price of
//! never letting the primary context die. `ResumePolicy` is where a budget or
//! backoff plugs in. The job that was running when the fault hit is dropped
//! without any completion signal.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crate::dispatch::Dispatch;
use crate::events::{Event, EventKind};
use crate::fault::{Fault, payload_message};

use super::interceptor::{self, LoopGuard, Verdict};
use super::supervisor::Supervisor;

type Payload = Box<dyn Any + Send + 'static>;

enum State {
    Dispatching,
    Faulted(Payload),
    Resuming,
}

/// Restart loop around the primary context's dispatch mechanism.
pub(crate) struct RecoveryLoop<'a> {
    sup: &'a Supervisor,
    faults: u32,
}

impl<'a> RecoveryLoop<'a> {
    pub(crate) fn new(sup: &'a Supervisor) -> Self {
        Self { sup, faults: 0 }
    }

    /// Runs `dispatch` until it returns normally.
    ///
    /// Panics only by resuming an unwind whose verdict is `Propagate`.
    pub(crate) fn run<D: Dispatch + ?Sized>(mut self, dispatch: &D) {
        let _guard = LoopGuard::enter();
        let primary = self.sup.primary();
        self.sup
            .emit(Event::new(EventKind::DispatchStarted).with_context(primary));

        let mut state = State::Dispatching;
        loop {
            state = match state {
                State::Dispatching => {
                    match panic::catch_unwind(AssertUnwindSafe(|| dispatch.run())) {
                        Ok(()) => break,
                        Err(payload) => State::Faulted(payload),
                    }
                }
                State::Faulted(payload) => self.on_fault(payload),
                State::Resuming => {
                    self.resume();
                    State::Dispatching
                }
            };
        }

        self.sup.emit(
            Event::new(EventKind::DispatchStopped)
                .with_context(primary)
                .with_attempt(self.faults),
        );
    }

    fn on_fault(&mut self, payload: Payload) -> State {
        self.faults = self.faults.saturating_add(1);
        let cfg = self.sup.config();

        let recover = match interceptor::take_verdict() {
            Some(Verdict::Recover) => true,
            Some(Verdict::Propagate) => false,
            None => {
                let fault = Fault::from_payload(payload.as_ref(), cfg.capture_backtrace);
                self.sup.record(&fault);
                if !cfg.recover_primary_context {
                    self.sup.emit(Event::for_fault(EventKind::FaultPropagated, &fault));
                }
                cfg.recover_primary_context
            }
        };
        if !recover {
            panic::resume_unwind(payload);
        }

        self.sup.emit(
            Event::new(EventKind::DispatchFaulted)
                .with_context(self.sup.primary())
                .with_attempt(self.faults)
                .with_reason(payload_message(payload.as_ref())),
        );
        State::Resuming
    }

    fn resume(&self) {
        let delay = self.sup.config().resume.delay(self.faults);
        self.sup.emit(
            Event::new(EventKind::DispatchResuming)
                .with_context(self.sup.primary())
                .with_attempt(self.faults)
                .with_delay(delay),
        );
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}
