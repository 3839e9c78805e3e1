//! # Event subscribers for the faultvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Interceptor / ReportWriter / RecoveryLoop
//!        │
//!        └── emit(Event) ──► SubscriberSet ──► Subscribe::on_event(&Event)   (inline, same thread)
//!                                 │                 ├──► LogWriter (tracing)
//!                                 │                 └──► Custom ...
//!                                 └──► Bus::publish(Event)                  (out-of-band receivers)
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use faultvisor::{Event, EventKind, Subscribe};
//!
//! struct CrashCounter(std::sync::atomic::AtomicU64);
//!
//! impl Subscribe for CrashCounter {
//!     fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::FaultIntercepted {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
