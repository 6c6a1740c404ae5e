//! Minimum interval between program generations for one user.

use std::time::Duration;

use tokio::time::Instant;

/// Fixed-window generation cooldown.
///
/// Uses [`tokio::time::Instant`] so tests can drive it with a paused clock.
#[derive(Debug, Clone, Copy)]
pub struct GenerationCooldown {
    window: Duration,
}

impl GenerationCooldown {
    /// Cooldown of `window` between generations.
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Length of the window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Time still to wait after a generation at `last`, or `None` if a new
    /// generation is allowed now.
    pub fn remaining(&self, last: Option<Instant>) -> Option<Duration> {
        let elapsed = last?.elapsed();
        self.window.checked_sub(elapsed).filter(|d| !d.is_zero())
    }
}
