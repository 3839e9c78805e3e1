//! # DispatchQueue: a job FIFO for the primary context.
//!
//! Jobs are `FnOnce() + Send` closures queued through an unbounded
//! `tokio::sync::mpsc` channel and consumed with `blocking_recv`, so no async
//! runtime is needed.
//!
//! ## Rules
//! - **FIFO**: jobs run in submission order, one at a time.
//! - **Fault tolerant**: a panicking job leaves the queue intact; the receiver
//!   lock is released before any job runs, and a poisoned lock is recovered.
//!   The panicking job itself is dropped with no completion signal.
//! - **Quit**: [`DispatchHandle::quit`] makes `run` return after the jobs
//!   queued before it.
//! - **Fresh verdict per job**: a panic caught by user code inside one job
//!   cannot leave a recovery verdict behind for the next one.
//! - **No async runtime**: `run` blocks the calling thread and must not be
//!   called from inside a tokio runtime;
//!   [`Supervisor::run_primary`](crate::Supervisor::run_primary) refuses to.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::core::clear_verdict;
use crate::dispatch::Dispatch;
use crate::error::DispatchError;

/// Unit of work executed by a dispatch loop.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(Job),
    Quit,
}

/// Cloneable submitter for a [`DispatchQueue`].
#[derive(Clone, Debug)]
pub struct DispatchHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl DispatchHandle {
    /// Queues `job` for execution on the dispatch loop.
    pub fn submit<F>(&self, job: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx
            .send(Message::Run(Box::new(job)))
            .map_err(|_| DispatchError::Closed)
    }

    /// Asks the dispatch loop to return once the jobs queued so far have run.
    pub fn quit(&self) -> Result<(), DispatchError> {
        self.tx.send(Message::Quit).map_err(|_| DispatchError::Closed)
    }

    /// Whether the queue behind this handle has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Job queue implementing [`Dispatch`].
pub struct DispatchQueue {
    rx: Mutex<mpsc::UnboundedReceiver<Message>>,
    handle: DispatchHandle,
}

impl DispatchQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            rx: Mutex::new(rx),
            handle: DispatchHandle { tx },
        }
    }

    /// Returns a submitter for this queue.
    pub fn handle(&self) -> DispatchHandle {
        self.handle.clone()
    }

    fn next(&self) -> Option<Message> {
        let mut rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        rx.blocking_recv()
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch for DispatchQueue {
    fn run(&self) {
        while let Some(Message::Run(job)) = self.next() {
            clear_verdict();
            job();
        }
    }
}
