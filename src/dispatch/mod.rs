//! Dispatch loops: the blocking "run work" primitive of an execution context.
//!
//! The recovery loop only needs one thing from the host: a blocking call that
//! pulls and executes units of work until told to stop. That is [`Dispatch`].
//!
//! [`DispatchQueue`] is a ready-made implementation: a FIFO of boxed jobs fed
//! through cloneable [`DispatchHandle`]s.
//!
//! ```text
//! DispatchHandle::submit(job) ──► [mpsc queue] ──► DispatchQueue::run() ──► job()
//! DispatchHandle::quit()      ──►                  run() returns
//! ```

mod queue;

pub use queue::{DispatchHandle, DispatchQueue, Job};

/// Blocking dispatch loop of an execution context.
///
/// `run` is re-entered by the recovery loop after every fault, so an
/// implementation must leave itself in a state where a fresh call keeps
/// processing pending work.
pub trait Dispatch {
    /// Pulls and runs units of work until asked to quit.
    ///
    /// Returning normally is treated as an explicit shutdown of the loop.
    fn run(&self);
}

impl<D: Dispatch + ?Sized> Dispatch for &D {
    fn run(&self) {
        (**self).run()
    }
}
