//! # Fault: an intercepted panic.
//!
//! A [`Fault`] is the immutable record of one panic as seen by the supervisor:
//! the raising context, the panic message and location, and (optionally) a
//! backtrace captured on the faulting thread before it unwinds.
//!
//! Faults are built in two places:
//! - [`Fault::capture`] from the panic hook's [`PanicHookInfo`];
//! - [`Fault::from_payload`] from a payload caught by `catch_unwind`, used when
//!   the recovery loop catches a panic our hook never saw.
//!
//! ## Rendering
//! ```text
//! thread 'primary' (ThreadId(2)) panicked at src/jobs.rs:42:9:
//! boom
//! stack backtrace:
//!    0: ...
//! ```

use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt::Write as _;
use std::panic::PanicHookInfo;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Local};

use crate::core::ContextId;

/// One intercepted fault. Immutable once captured.
#[derive(Clone, Debug)]
pub struct Fault {
    context: ContextId,
    thread_name: Option<Arc<str>>,
    message: Arc<str>,
    location: Option<Arc<str>>,
    backtrace: Option<Arc<str>>,
    raised_at: DateTime<Local>,
}

impl Fault {
    /// Creates a fault raised on the calling thread with the given message.
    ///
    /// No location or backtrace is attached; use the builder methods to add them.
    pub fn new(message: impl Into<Arc<str>>) -> Self {
        let current = thread::current();
        Self {
            context: ContextId::of(&current),
            thread_name: current.name().map(Arc::from),
            message: message.into(),
            location: None,
            backtrace: None,
            raised_at: Local::now(),
        }
    }

    /// Captures a fault from inside the panic hook.
    ///
    /// Must be called on the panicking thread so the context identity and the
    /// backtrace describe the fault, not the handler.
    pub fn capture(info: &PanicHookInfo<'_>, with_backtrace: bool) -> Self {
        let backtrace = with_backtrace.then(|| Backtrace::force_capture().to_string());
        let mut fault = Self::new(payload_message(info.payload()));
        fault.location = info
            .location()
            .map(|loc| Arc::from(format!("{}:{}:{}", loc.file(), loc.line(), loc.column())));
        fault.backtrace = backtrace.map(Arc::from);
        fault
    }

    /// Builds a fault from a payload returned by `catch_unwind`.
    ///
    /// The original location is lost by then; a backtrace, if requested, shows
    /// the catch site.
    pub fn from_payload(payload: &(dyn Any + Send), with_backtrace: bool) -> Self {
        let mut fault = Self::new(payload_message(payload));
        fault.backtrace = with_backtrace.then(|| Arc::from(Backtrace::force_capture().to_string()));
        fault
    }

    /// Attaches a source location (`file:line:col`).
    #[must_use]
    pub fn with_location(mut self, location: impl Into<Arc<str>>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attaches an already rendered backtrace.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: impl Into<Arc<str>>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }

    /// Context that raised the fault.
    #[inline]
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Name of the raising thread, if it had one.
    #[inline]
    pub fn thread_name(&self) -> Option<&str> {
        self.thread_name.as_deref()
    }

    /// Panic message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source location of the panic, if known.
    #[inline]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Rendered backtrace, if captured.
    #[inline]
    pub fn backtrace(&self) -> Option<&str> {
        self.backtrace.as_deref()
    }

    /// Local wall-clock time at which the fault was captured.
    #[inline]
    pub fn raised_at(&self) -> DateTime<Local> {
        self.raised_at
    }

    /// Renders the fault as the human-readable report body.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(
            self.message.len() + self.backtrace.as_deref().map_or(0, str::len) + 128,
        );
        let name = self.thread_name.as_deref().unwrap_or("<unnamed>");
        let _ = write!(out, "thread '{name}' ({}) panicked", self.context);
        if let Some(loc) = &self.location {
            let _ = write!(out, " at {loc}");
        }
        out.push_str(":\n");
        out.push_str(&self.message);
        out.push('\n');
        if let Some(bt) = &self.backtrace {
            out.push_str("stack backtrace:\n");
            out.push_str(bt);
            if !bt.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
