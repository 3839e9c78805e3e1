//! # Execution context identity.
//!
//! A context is an OS thread. The supervisor compares the identity of the
//! thread that raised a fault against the configured primary context to decide
//! whether the fault may be recovered.

use std::fmt;
use std::thread::{self, ThreadId};

/// Identity of an execution context (a thread).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextId(ThreadId);

impl ContextId {
    /// Identity of the calling thread.
    #[inline]
    pub fn current() -> Self {
        Self(thread::current().id())
    }

    /// Identity of the given thread.
    #[inline]
    pub fn of(thread: &thread::Thread) -> Self {
        Self(thread.id())
    }

    /// Underlying thread id.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.0
    }
}

impl From<ThreadId> for ContextId {
    fn from(id: ThreadId) -> Self {
        Self(id)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_differs_across_threads() {
        let here = ContextId::current();
        let there = thread::spawn(ContextId::current).join().unwrap();
        assert_ne!(here, there);
        assert_eq!(here, ContextId::of(&thread::current()));
    }
}
