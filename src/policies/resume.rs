//! # Resume policy for the primary recovery loop.
//!
//! [`ResumePolicy`] decides the pause between a primary-context fault and the
//! next entry into the dispatch loop.
//!
//! ```text
//! ResumePolicy::Immediate           → re-enter at once (default)
//! ResumePolicy::Backoff(policy)     → sleep policy.next(fault - 1), then re-enter
//! ```
//!
//! Neither variant ever gives up: the loop has no terminal state.

use std::time::Duration;

use super::BackoffPolicy;

/// Pause between a primary fault and re-entering the dispatch loop.
#[derive(Clone, Copy, Debug)]
pub enum ResumePolicy {
    /// Re-enter immediately.
    Immediate,
    /// Pause according to a backoff policy keyed by the loop's fault count.
    Backoff(BackoffPolicy),
}

impl ResumePolicy {
    /// Pause before recovering from fault number `fault` (1-based).
    pub fn delay(&self, fault: u32) -> Duration {
        match self {
            ResumePolicy::Immediate => Duration::ZERO,
            ResumePolicy::Backoff(backoff) => backoff.next(fault.saturating_sub(1)),
        }
    }
}

impl Default for ResumePolicy {
    /// Returns [`ResumePolicy::Immediate`].
    fn default() -> Self {
        ResumePolicy::Immediate
    }
}
