// ── Rolling failure budget ──
//
// More than `threshold` failed ticks inside one window is fatal. The
// window restarts once it is older than `window`.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::CoreError;

/// Failures tolerated per window before the sync loop gives up.
pub const DEFAULT_THRESHOLD: u32 = 10;

/// Length of the rolling window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Counts sync failures inside a window that restarts once it is older than
/// [`DEFAULT_WINDOW`].
#[derive(Debug, Clone)]
pub struct FailureBudget {
    threshold: u32,
    window: Duration,
    failures: u32,
    window_start: Instant,
}

impl FailureBudget {
    pub fn new(now: Instant) -> Self {
        Self::with_limits(DEFAULT_THRESHOLD, DEFAULT_WINDOW, now)
    }

    pub fn with_limits(threshold: u32, window: Duration, now: Instant) -> Self {
        Self {
            threshold,
            window,
            failures: 0,
            window_start: now,
        }
    }

    /// Failures counted in the current window.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Reset the counter if more than a full window has passed since the
    /// last reset.
    pub fn roll(&mut self, now: Instant) {
        if now.saturating_duration_since(self.window_start) > self.window {
            self.failures = 0;
            self.window_start = now;
        }
    }

    /// Count one failure.
    ///
    /// Returns the running count, or [`CoreError::BudgetExhausted`] once the
    /// count exceeds the threshold.
    pub fn record_failure(&mut self, now: Instant) -> Result<u32, CoreError> {
        self.roll(now);
        self.failures = self.failures.saturating_add(1);
        if self.failures > self.threshold {
            return Err(CoreError::BudgetExhausted {
                failures: self.failures,
                window: self.window,
            });
        }
        Ok(self.failures)
    }
}
