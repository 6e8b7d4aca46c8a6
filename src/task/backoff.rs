//! Exponential backoff
//!
//! The schedule is plain state advanced by [`Backoff::next_delay`]; callers
//! supply the elapsed time, so the schedule itself never reads a clock.

use std::time::Duration;

/// Exponential backoff with an interval cap and a total time budget
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    initial_interval: Duration,
    current_interval: Duration,
    max_interval: Duration,
    multiplier: f64,
    max_elapsed: Duration,
}

impl Backoff {
    /// First delay when waiting for a task
    pub const TASK_INITIAL_INTERVAL: Duration = Duration::from_secs(5);

    /// Largest delay when waiting for a task
    pub const TASK_MAX_INTERVAL: Duration = Duration::from_secs(60);

    /// Default budget when waiting for a task
    pub const TASK_MAX_ELAPSED: Duration = Duration::from_secs(60 * 60);

    /// Growth factor between consecutive delays
    pub const DEFAULT_MULTIPLIER: f64 = 1.5;

    /// Create a backoff schedule
    pub fn new(
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
        max_elapsed: Duration,
    ) -> Self {
        Self {
            initial_interval,
            current_interval: initial_interval,
            max_interval,
            multiplier: multiplier.max(1.0),
            max_elapsed,
        }
    }

    /// Schedule used when polling tasks: 5s growing to 60s, within
    /// `max_elapsed`
    pub fn for_task_wait(max_elapsed: Duration) -> Self {
        Self::new(
            Self::TASK_INITIAL_INTERVAL,
            Self::TASK_MAX_INTERVAL,
            Self::DEFAULT_MULTIPLIER,
            max_elapsed,
        )
    }

    /// Delay before the next attempt, or `None` once waiting that long would
    /// exceed the budget.
    pub fn next_delay(&mut self, elapsed: Duration) -> Option<Duration> {
        let delay = self.current_interval;

        if elapsed.saturating_add(delay) > self.max_elapsed {
            return None;
        }

        // Saturate at the cap when growth overflows `Duration`
        self.current_interval =
            Duration::try_from_secs_f64(self.current_interval.as_secs_f64() * self.multiplier)
                .unwrap_or(self.max_interval)
                .min(self.max_interval);

        Some(delay)
    }

    /// Start over from the initial interval
    pub fn reset(&mut self) {
        self.current_interval = self.initial_interval;
    }

    /// Delay returned by the next call to [`Backoff::next_delay`]
    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    pub fn max_elapsed(&self) -> Duration {
        self.max_elapsed
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::for_task_wait(Self::TASK_MAX_ELAPSED)
    }
}
