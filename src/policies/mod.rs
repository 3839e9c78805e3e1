//! Resume policies for the primary recovery loop.
//!
//! After the primary dispatch loop faults, the recovery loop asks a
//! [`ResumePolicy`] how long to pause before re-entering it.
//!
//! ## Contents
//! - [`ResumePolicy`] immediate re-entry (default) or backoff
//! - [`BackoffPolicy`] how the pause grows with consecutive faults (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization applied to the computed pause
//!
//! ## Defaults
//! - `ResumePolicy::Immediate`: zero backoff and no fault budget. A fault storm
//!   becomes a tight restart loop; that is accepted in exchange for never
//!   letting the primary context die.
//! - `BackoffPolicy::default()` → first=10ms, factor=2.0, max=5s, jitter=None.

mod backoff;
mod jitter;
mod resume;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use resume::ResumePolicy;
