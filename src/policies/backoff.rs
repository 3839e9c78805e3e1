//! # Backoff between primary-loop restarts.
//!
//! [`BackoffPolicy`] spaces out re-entries into the dispatch loop when the
//! primary context keeps faulting. The pause for the `n`-th consecutive fault
//! (0-indexed) is `first × factor^n`, clamped to `max`, then jittered. The base
//! is derived from the fault count alone, so jitter never feeds back into later
//! pauses.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use faultvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(10),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(10));
//! assert_eq!(backoff.next(3), Duration::from_millis(80));
//! assert_eq!(backoff.next(20), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Restart backoff policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Pause after the first fault.
    pub first: Duration,
    /// Upper bound for any pause.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the clamped pause.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `first = 10ms`;
    /// - `factor = 2.0`;
    /// - `max = 5s`;
    /// - `jitter = None`.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(10),
            max: Duration::from_secs(5),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the pause for the given fault index (0-indexed).
    ///
    /// Non-finite or negative intermediate values collapse to `max`.
    pub fn next(&self, fault: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = fault.min(i32::MAX as u32) as i32;
        let raw = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !raw.is_finite() || raw < 0.0 || raw > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(raw)
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(first_ms: u64, max_ms: u64, factor: f64) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max: Duration::from_millis(max_ms),
            factor,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn grows_exponentially_until_capped() {
        let p = policy(100, 1_000, 2.0);
        assert_eq!(p.next(0), Duration::from_millis(100));
        assert_eq!(p.next(1), Duration::from_millis(200));
        assert_eq!(p.next(2), Duration::from_millis(400));
        assert_eq!(p.next(3), Duration::from_millis(800));
        assert_eq!(p.next(4), Duration::from_millis(1_000));
        assert_eq!(p.next(u32::MAX), Duration::from_millis(1_000));
    }

    #[test]
    fn first_above_max_is_clamped() {
        assert_eq!(policy(10_000, 5_000, 2.0).next(0), Duration::from_millis(5_000));
    }

    #[test]
    fn unit_factor_is_constant() {
        let p = policy(50, 1_000, 1.0);
        for fault in 0..8 {
            assert_eq!(p.next(fault), Duration::from_millis(50));
        }
    }

    #[test]
    fn full_jitter_stays_within_base() {
        let p = BackoffPolicy {
            jitter: JitterPolicy::Full,
            ..policy(100, 10_000, 2.0)
        };
        for _ in 0..100 {
            assert!(p.next(2) <= Duration::from_millis(400));
        }
    }
}
