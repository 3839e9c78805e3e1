//! # Supervisor configuration.
//!
//! Provides [`SupervisorConfig`], the settings captured by
//! [`SupervisorBuilder::install`](crate::SupervisorBuilder::install).
//!
//! Config is read-only once installed: the supervisor keeps its own copy and the
//! panic hook reads it through a single `Arc` snapshot per fault, so a fault never
//! observes half of one configuration and half of another.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`SupervisorConfig::bus_capacity_clamped`]
//! - `report_prefix = ""` → falls back to [`DEFAULT_REPORT_PREFIX`]

use crate::policies::ResumePolicy;

/// Artifact name prefix used when none is configured.
pub const DEFAULT_REPORT_PREFIX: &str = "crashErrorInfo";

/// Process-wide configuration for the fault supervisor.
///
/// ## Field semantics
/// - `persist_faults`: write a diagnostic report for every intercepted fault
/// - `recover_primary_context`: restart the primary dispatch loop instead of dying
/// - `capture_backtrace`: include a forced backtrace in each report
/// - `report_prefix`: artifact name prefix (`<prefix><timestamp>.txt`)
/// - `bus_capacity`: broadcast ring size for out-of-band event consumers
/// - `resume`: delay policy between a primary fault and the next dispatch entry
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Invoke the report writer for each fault.
    pub persist_faults: bool,

    /// Keep the primary context alive across faults.
    ///
    /// When `false`, a primary-context fault follows the runtime's default fatal
    /// path exactly like a fault on any other context.
    pub recover_primary_context: bool,

    /// Capture a full backtrace on the faulting thread, regardless of
    /// `RUST_BACKTRACE`.
    pub capture_backtrace: bool,

    /// Prefix of every artifact name.
    pub report_prefix: String,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// How long to wait before re-entering the dispatch loop after a fault.
    pub resume: ResumePolicy,
}

impl SupervisorConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the artifact prefix, falling back to the default when empty.
    #[inline]
    pub fn report_prefix(&self) -> &str {
        if self.report_prefix.is_empty() {
            DEFAULT_REPORT_PREFIX
        } else {
            &self.report_prefix
        }
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `persist_faults = true`
    /// - `recover_primary_context = true`
    /// - `capture_backtrace = true`
    /// - `report_prefix = "crashErrorInfo"`
    /// - `bus_capacity = 1024`
    /// - `resume = ResumePolicy::Immediate` (zero backoff, no fault budget)
    fn default() -> Self {
        Self {
            persist_faults: true,
            recover_primary_context: true,
            capture_backtrace: true,
            report_prefix: DEFAULT_REPORT_PREFIX.to_string(),
            bus_capacity: 1024,
            resume: ResumePolicy::Immediate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_persist_and_recover() {
        let cfg = SupervisorConfig::default();
        assert!(cfg.persist_faults);
        assert!(cfg.recover_primary_context);
        assert_eq!(cfg.report_prefix(), "crashErrorInfo");
        assert!(matches!(cfg.resume, ResumePolicy::Immediate));
    }

    #[test]
    fn sentinels_are_clamped() {
        let cfg = SupervisorConfig {
            bus_capacity: 0,
            report_prefix: String::new(),
            ..SupervisorConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.report_prefix(), DEFAULT_REPORT_PREFIX);
    }
}
