//! # Jitter for restart pauses.
//!
//! [`JitterPolicy`] randomizes a computed restart pause.
//!
//! - [`JitterPolicy::None`]: exact pause
//! - [`JitterPolicy::Full`]: uniform in `[0, pause]`
//! - [`JitterPolicy::Equal`]: `pause/2 + uniform[0, pause/2]`

use std::time::Duration;

use rand::Rng;

/// Randomization applied to a restart pause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact pause.
    None,
    /// Uniform in `[0, pause]`.
    Full,
    /// Half the pause plus uniform in `[0, pause/2]`.
    Equal,
}

impl Default for JitterPolicy {
    /// Returns [`JitterPolicy::None`].
    fn default() -> Self {
        JitterPolicy::None
    }
}

impl JitterPolicy {
    /// Applies jitter to `pause`.
    pub fn apply(&self, pause: Duration) -> Duration {
        let ms = pause.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return pause;
        }
        match self {
            JitterPolicy::None => pause,
            JitterPolicy::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                let extra = if half == 0 {
                    0
                } else {
                    rand::rng().random_range(0..=half)
                };
                Duration::from_millis(half + extra)
            }
        }
    }
}
