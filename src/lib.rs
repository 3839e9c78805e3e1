//! # faultvisor
//!
//! **Faultvisor** is a process-wide panic supervisor for Rust.
//!
//! It installs a global panic hook that logs every uncaught panic and writes a
//! plain-text crash report for it. Panics raised on the **primary** context
//! (the thread whose death ends the process) are not allowed to kill it: the
//! primary dispatch loop is restarted and keeps processing new work.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   thread A panics     thread B panics     primary thread panics
//!         │                   │                       │
//!         ▼                   ▼                       ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Fault interceptor (process-wide panic hook)                      │
//! │  - Fault::capture (message, location, backtrace)                  │
//! │  - SubscriberSet::emit(FaultIntercepted)  → LogWriter (tracing)   │
//! │  - ReportWriter::persist                  → crashErrorInfo*.txt   │
//! │  - verdict: Recover (primary) | Propagate (everyone else)         │
//! └──────┬──────────────────┬──────────────────────────────┬──────────┘
//!        ▼                  ▼                              ▼
//!   previous hook      previous hook                ┌──────────────┐
//!   thread A dies      thread B dies                │ RecoveryLoop │
//!                                                   │ catch_unwind │
//!                                                   │ → resume     │
//!                                                   └──────┬───────┘
//!                                                          ▼
//!                                                   Dispatch::run() again
//! ```
//!
//! ### Per-fault ordering
//! ```text
//! log (FaultIntercepted) → persist (Report*) → RecoveryScheduled | FaultPropagated
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Installation**  | Configure and install the process-wide handler.              | [`Supervisor`], [`SupervisorBuilder`]       |
//! | **Recovery**      | Keep the primary dispatch loop alive across panics.          | [`Dispatch`], [`DispatchQueue`]             |
//! | **Reports**       | Persist one text report per fault.                           | [`ReportWriter`], [`Storage`], [`FsStorage`]|
//! | **Subscriber API**| Observe fault handling (logging, counters, alerts).          | [`Subscribe`], [`Event`], [`EventKind`]     |
//! | **Policies**      | Pause between primary restarts (immediate by default).       | [`ResumePolicy`], [`BackoffPolicy`]         |
//! | **Errors**        | Typed errors for reporting and API misuse.                   | [`ReportError`], [`SupervisorError`]        |
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
//!
//! std::thread::spawn(move || {
//!     work.submit(|| panic!("boom")).unwrap();     // logged, reported, survived
//!     work.submit(|| println!("still here")).unwrap();
//!     work.quit().unwrap();
//! });
//!
//! // Blocks on the primary thread until `quit`.
//! sup.run_primary(&queue).unwrap();
//! ```
//!
//! ## Limitations
//! - Requires `panic = "unwind"`; with `panic = "abort"` reports are still
//!   written but nothing can be recovered.
//! - The panic hook fires when a panic is raised, so panics later caught by
//!   user code are reported too.
//! - [`Supervisor::run_primary`] blocks its thread and refuses to run inside a
//!   tokio runtime; give the dispatch loop a plain thread.

mod core;
mod dispatch;
mod error;
mod events;
mod fault;
mod policies;
mod report;
mod subscribers;

// ---- Public re-exports ----

pub use self::core::{ContextId, DEFAULT_REPORT_PREFIX, Supervisor, SupervisorBuilder, SupervisorConfig};
pub use dispatch::{Dispatch, DispatchHandle, DispatchQueue, Job};
pub use error::{DispatchError, ReportError, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use fault::Fault;
pub use policies::{BackoffPolicy, JitterPolicy, ResumePolicy};
pub use report::{FsStorage, ReportOutcome, ReportWriter, Storage};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
